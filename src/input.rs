// alignment-writer: Pack and unpack pseudoalignment matrices.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Building the query and target name indexes
//!
//! Packing needs two external inputs: the query names in their order of
//! appearance in the sequencing data, and the target names in the column
//! order of the pseudoalignment. This module reads both and also opens
//! possibly compressed plain-text alignment files for reading.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::error::Error;
use crate::error::Result;

/// Query name to matrix row mapping, in order of appearance.
#[derive(Clone, Debug, Default)]
pub struct QueryIndex {
    name_to_pos: HashMap<String, u64>,
    pos_to_name: HashMap<u64, String>,
}

impl QueryIndex {
    /// Build the index from names in order of appearance.
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let mut name_to_pos: HashMap<String, u64> = HashMap::new();
        let mut pos_to_name: HashMap<u64, String> = HashMap::new();
        for name in names {
            if name_to_pos.contains_key(&name) {
                continue;
            }
            let pos = name_to_pos.len() as u64;
            name_to_pos.insert(name.clone(), pos);
            pos_to_name.insert(pos, name);
        }
        QueryIndex { name_to_pos, pos_to_name }
    }

    pub fn len(&self) -> usize {
        self.name_to_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_pos.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<u64> {
        self.name_to_pos.get(name).copied()
    }

    pub fn name(&self, pos: u64) -> Option<&str> {
        self.pos_to_name.get(&pos).map(|name| name.as_str())
    }
}

/// Target name to matrix column mapping, in column order.
#[derive(Clone, Debug, Default)]
pub struct TargetIndex {
    name_to_pos: HashMap<String, u64>,
    names: Vec<String>,
}

impl TargetIndex {
    /// Build the index from names in column order.
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let names: Vec<String> = names.into_iter().collect();
        let name_to_pos = names
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos as u64))
            .collect();
        TargetIndex { name_to_pos, names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<u64> {
        self.name_to_pos.get(name).copied()
    }

    /// Target names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Read query names from a FASTA/FASTQ file
///
/// Records the part of each sequence identifier before the first space, in
/// order of appearance. Compressed inputs are handled by needletail.
///
pub fn read_query_index(path: &Path) -> Result<QueryIndex> {
    let mut reader = needletail::parse_fastx_file(path)
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string())))?;

    let mut names: Vec<String> = Vec::new();
    while let Some(record) = reader.next() {
        let record = record
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string())))?;
        let id = String::from_utf8_lossy(record.id()).to_string();
        let name = id.split(' ').next().unwrap_or_default().to_string();
        names.push(name);
    }

    Ok(QueryIndex::from_names(names))
}

/// Read target names from a plain list with one name per line.
pub fn read_target_index(path: &Path) -> Result<TargetIndex> {
    let reader = BufReader::new(File::open(path)?);
    let names = reader
        .lines()
        .collect::<io::Result<Vec<String>>>()?
        .into_iter()
        .filter(|line| !line.is_empty());
    Ok(TargetIndex::from_names(names))
}

/// Open a possibly compressed plain-text input file
///
/// Decompression is chosen from the file extension: `.gz`, `.bz2`, and
/// `.xz` inputs are decompressed transparently, anything else is read as-is.
///
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let reader: Box<dyn BufRead> = if name.ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else if name.ends_with(".bz2") {
        Box::new(BufReader::new(BzDecoder::new(file)))
    } else if name.ends_with(".xz") {
        Box::new(BufReader::new(XzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn query_index_in_order_of_appearance() {
        use super::QueryIndex;

        let names = ["ERR4035126.2", "ERR4035126.1", "ERR4035126.7543"];
        let index = QueryIndex::from_names(names.iter().map(|x| x.to_string()));

        assert_eq!(index.len(), 3);
        assert_eq!(index.position("ERR4035126.2"), Some(0));
        assert_eq!(index.position("ERR4035126.1"), Some(1));
        assert_eq!(index.position("ERR4035126.7543"), Some(2));
        assert_eq!(index.position("ERR4035126.4996"), None);
        assert_eq!(index.name(1), Some("ERR4035126.1"));
        assert_eq!(index.name(3), None);
    }

    #[test]
    fn target_index_keeps_column_order() {
        use super::TargetIndex;

        let names = ["chr.fasta", "plasmid.fasta"];
        let index = TargetIndex::from_names(names.iter().map(|x| x.to_string()));

        assert_eq!(index.len(), 2);
        assert_eq!(index.names(), &["chr.fasta".to_string(), "plasmid.fasta".to_string()]);
        assert_eq!(index.position("plasmid.fasta"), Some(1));
        assert_eq!(index.position("phage.fasta"), None);
    }
}
