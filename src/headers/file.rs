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
use std::io::Read;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::Format;
use crate::error::Error;
use crate::error::Result;
use crate::xz::compress_xz;
use crate::xz::decompress_xz;
use crate::xz::scan_xz_stream;

/// Name and column position of one alignment target.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TargetRecord {
    pub target: String,
    pub pos: u64,
}

/// File header of the packed format
///
/// Written once at the start of a pack as an .xz-compressed JSON mapping and
/// immutable afterwards. The `targets` records cover the column positions
/// `[0, n_targets)` exactly once.
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileHeader {
    pub n_queries: u64,
    pub n_targets: u64,
    pub input_format: Format,
    pub targets: Vec<TargetRecord>,
}

impl FileHeader {
    /// Build a header from target names listed in column order.
    pub fn new(input_format: Format, n_queries: u64, target_names: &[String]) -> Self {
        let targets = target_names
            .iter()
            .enumerate()
            .map(|(pos, target)| TargetRecord { target: target.clone(), pos: pos as u64 })
            .collect();
        FileHeader { n_queries, n_targets: target_names.len() as u64, input_format, targets }
    }

    /// Target names ordered by their column position
    ///
    /// Errors with [Error::MalformedHeader] unless the `pos` values cover
    /// `[0, n_targets)` exactly once.
    ///
    pub fn target_names(&self) -> Result<Vec<String>> {
        if self.targets.len() as u64 != self.n_targets {
            return Err(Error::MalformedHeader(format!(
                "expected {} target records, found {}",
                self.n_targets,
                self.targets.len()
            )));
        }
        let mut names: Vec<Option<String>> = vec![None; self.targets.len()];
        for record in &self.targets {
            if record.pos >= self.n_targets {
                return Err(Error::MalformedHeader(format!(
                    "target position {} is out of range",
                    record.pos
                )));
            }
            if names[record.pos as usize]
                .replace(record.target.clone())
                .is_some()
            {
                return Err(Error::MalformedHeader(format!(
                    "duplicate target position {}",
                    record.pos
                )));
            }
        }
        Ok(names.into_iter().flatten().collect())
    }
}

/// Compress and write the file header as a standalone .xz stream.
pub fn write_file_header<W: Write>(header: &FileHeader, conn: &mut W) -> Result<()> {
    let json = serde_json::to_vec(header).map_err(|e| Error::MalformedHeader(e.to_string()))?;
    conn.write_all(&compress_xz(&json)?)?;
    Ok(())
}

/// Scan, decompress, and parse the file header at the current position.
pub fn read_file_header<R: Read>(conn: &mut R) -> Result<FileHeader> {
    let stream = scan_xz_stream(conn).map_err(|e| match e {
        Error::NotXz => Error::MalformedFrame,
        other => other,
    })?;
    let json = decompress_xz(&stream)?;
    serde_json::from_slice(&json).map_err(|e| Error::MalformedHeader(e.to_string()))
}
