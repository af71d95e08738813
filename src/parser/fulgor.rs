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

/// Parse a line from Fulgor
///
/// Tab-separated; the first field is the query name, the second an
/// advertised hit count, and the remaining fields are target column
/// indices. The listed targets are authoritative over the advertised count.
///
/// Returns the number of hits on the line.
///
pub fn read_fulgor(
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

    let count_field = records.next().ok_or_else(|| Error::MalformedInput {
        line: line_number,
        reason: "missing alignment count field".to_string(),
    })?;
    let _advertised = count_field.parse::<u64>().map_err(|e| Error::MalformedInput {
        line: line_number,
        reason: format!("alignment count '{}': {}", count_field, e),
    })?;

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
