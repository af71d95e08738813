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

use noodles_sam as sam;

use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::input::QueryIndex;
use crate::input::TargetIndex;

/// Parse a line from a [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf) file
///
/// Only the query name and the reference sequence name are used; a record
/// with reference `*` is unmapped and contributes no hit. Header lines must
/// be consumed before calling this.
///
/// Returns the number of hits on the line, at most one.
///
pub fn read_sam(
    line: &str,
    line_number: usize,
    queries: &QueryIndex,
    targets: &TargetIndex,
    bits: &mut Bitmap,
    seen_queries: &mut HashSet<u64>,
) -> Result<usize> {
    let record = sam::Record::try_from(line.as_bytes()).map_err(|e| Error::MalformedInput {
        line: line_number,
        reason: e.to_string(),
    })?;

    let query_name = record
        .name()
        .ok_or_else(|| Error::MalformedInput {
            line: line_number,
            reason: "missing query name".to_string(),
        })?
        .to_string();
    let read_id = queries
        .position(&query_name)
        .ok_or_else(|| Error::UnknownName { name: query_name, line: line_number })?;
    seen_queries.insert(read_id);

    let Some(target_name) = record.reference_sequence_name() else {
        // Unmapped
        return Ok(0);
    };
    let target_name = target_name.to_string();
    let target_id = targets
        .position(&target_name)
        .ok_or_else(|| Error::UnknownName { name: target_name, line: line_number })?;

    bits.bulk_insert(read_id * targets.len() as u64 + target_id)?;

    Ok(1)
}
