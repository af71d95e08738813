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
use crate::input::QueryIndex;
use crate::input::TargetIndex;

/// Validate the Bifrost column header line
///
/// The line lists `query_name` followed by the target names in column
/// order. The names must match the target index column for column; a
/// mismatch fails with [Error::UnknownName] naming the first offender.
///
pub fn check_preamble(line: &str, targets: &TargetIndex) -> Result<()> {
    let separator: char = '\t';
    let mut records = line.split(separator);

    if records.next().unwrap_or_default() != "query_name" {
        return Err(Error::MalformedInput {
            line: 1,
            reason: "column header line must start with 'query_name'".to_string(),
        });
    }

    let names: Vec<&str> = records.collect();
    if names.len() != targets.len() {
        return Err(Error::MalformedInput {
            line: 1,
            reason: format!(
                "column header lists {} targets, expected {}",
                names.len(),
                targets.len()
            ),
        });
    }
    for (name, expected) in names.iter().zip(targets.names()) {
        if name != expected {
            return Err(Error::UnknownName { name: name.to_string(), line: 1 });
        }
    }

    Ok(())
}

/// Parse a line from Bifrost
///
/// Tab-separated; the first field is the query name and the remaining
/// `n_targets` fields are presence flags in column order. Any nonzero flag
/// contributes a hit.
///
/// Returns the number of hits on the line.
///
pub fn read_bifrost(
    line: &str,
    line_number: usize,
    queries: &QueryIndex,
    targets: &TargetIndex,
    bits: &mut Bitmap,
    seen_queries: &mut HashSet<u64>,
) -> Result<usize> {
    let n_targets = targets.len() as u64;
    let separator: char = '\t';
    let mut records = line.split(separator);

    let query_name = records.next().unwrap_or_default();
    let read_id = queries
        .position(query_name)
        .ok_or_else(|| Error::UnknownName { name: query_name.to_string(), line: line_number })?;
    seen_queries.insert(read_id);

    let mut n_alignments = 0;
    for (target_id, record) in records.enumerate() {
        if target_id as u64 >= n_targets {
            return Err(Error::MalformedInput {
                line: line_number,
                reason: format!("more than {} presence flags", n_targets),
            });
        }
        let flag = record.parse::<u64>().map_err(|e| Error::MalformedInput {
            line: line_number,
            reason: format!("presence flag '{}': {}", record, e),
        })?;
        if flag > 0 {
            bits.bulk_insert(read_id * n_targets + target_id as u64)?;
            n_alignments += 1;
        }
    }

    Ok(n_alignments)
}
