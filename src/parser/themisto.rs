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
use std::collections::HashSet;

use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::input::TargetIndex;

/// Parse a line from Themisto
///
/// Space-separated; the first field is the numerical read id, which is also
/// the matrix row, and the remaining fields are target column indices.
///
/// Returns the number of hits on the line.
///
pub fn read_themisto(
    line: &str,
    line_number: usize,
    targets: &TargetIndex,
    bits: &mut Bitmap,
    seen_queries: &mut HashSet<u64>,
) -> Result<usize> {
    let n_targets = targets.len() as u64;
    let separator: char = ' ';
    let mut records = line.split(separator);

    let id_field = records.next().unwrap_or_default();
    let read_id = id_field.parse::<u64>().map_err(|e| Error::MalformedInput {
        line: line_number,
        reason: format!("read id '{}': {}", id_field, e),
    })?;
    seen_queries.insert(read_id);

    let mut n_alignments = 0;
    for record in records {
        if record.is_empty() {
            continue;
        }
        let target_id = record.parse::<u64>().map_err(|e| Error::MalformedInput {
            line: line_number,
            reason: format!("target index '{}': {}", record, e),
        })?;
        if target_id >= n_targets {
            return Err(Error::UnknownName { name: record.to_string(), line: line_number });
        }
        bits.bulk_insert(read_id * n_targets + target_id)?;
        n_alignments += 1;
    }

    Ok(n_alignments)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_themisto_line_multiple_aligned() {
        use std::collections::HashSet;
        use crate::bitmap::Bitmap;
        use crate::input::TargetIndex;
        use super::read_themisto;

        let targets = TargetIndex::from_names((0..12).map(|i| format!("target.{}", i)));
        let mut bits = Bitmap::new(200 * 12);
        let mut seen: HashSet<u64> = HashSet::new();

        let got = read_themisto("128 0 7 11 3", 1, &targets, &mut bits, &mut seen).unwrap();
        bits.flush();

        assert_eq!(got, 4);
        assert!(seen.contains(&128));
        let positions: Vec<u64> = bits.iter().collect();
        assert_eq!(positions, vec![128 * 12, 128 * 12 + 3, 128 * 12 + 7, 128 * 12 + 11]);
    }

    #[test]
    fn read_themisto_line_empty() {
        use std::collections::HashSet;
        use crate::bitmap::Bitmap;
        use crate::input::TargetIndex;
        use super::read_themisto;

        let targets = TargetIndex::from_names((0..2).map(|i| format!("target.{}", i)));
        let mut bits = Bitmap::new(200000 * 2);
        let mut seen: HashSet<u64> = HashSet::new();

        let got = read_themisto("185216", 1, &targets, &mut bits, &mut seen).unwrap();
        bits.flush();

        assert_eq!(got, 0);
        assert!(seen.contains(&185216));
        assert_eq!(bits.count_ones(), 0);
    }

    #[test]
    fn read_themisto_tolerates_trailing_separator() {
        use std::collections::HashSet;
        use crate::bitmap::Bitmap;
        use crate::input::TargetIndex;
        use super::read_themisto;

        let targets = TargetIndex::from_names((0..3).map(|i| format!("target.{}", i)));
        let mut bits = Bitmap::new(2 * 3);
        let mut seen: HashSet<u64> = HashSet::new();

        let got = read_themisto("0 0 2 ", 1, &targets, &mut bits, &mut seen).unwrap();
        bits.flush();

        assert_eq!(got, 2);
        let positions: Vec<u64> = bits.iter().collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn read_themisto_rejects_out_of_range_target() {
        use std::collections::HashSet;
        use crate::bitmap::Bitmap;
        use crate::error::Error;
        use crate::input::TargetIndex;
        use super::read_themisto;

        let targets = TargetIndex::from_names((0..2).map(|i| format!("target.{}", i)));
        let mut bits = Bitmap::new(10 * 2);
        let mut seen: HashSet<u64> = HashSet::new();

        let got = read_themisto("3 0 5", 4, &targets, &mut bits, &mut seen);

        assert!(matches!(got, Err(Error::UnknownName { line: 4, .. })));
    }

    #[test]
    fn read_themisto_rejects_garbage() {
        use std::collections::HashSet;
        use crate::bitmap::Bitmap;
        use crate::error::Error;
        use crate::input::TargetIndex;
        use super::read_themisto;

        let targets = TargetIndex::from_names((0..2).map(|i| format!("target.{}", i)));
        let mut bits = Bitmap::new(10 * 2);
        let mut seen: HashSet<u64> = HashSet::new();

        let got = read_themisto("readA\t1\t0", 7, &targets, &mut bits, &mut seen);

        assert!(matches!(got, Err(Error::MalformedInput { line: 7, .. })));
    }
}
