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

//! Packing plain-text pseudoalignments
//!
//! The packer drives a [dialect parser](crate::parser) over the input
//! lines, accumulating hits into one [Bitmap] and the rows touched since
//! the last flush into a set. Whenever the hit count passes the buffer
//! threshold the bitmap is serialized and written out as one block together
//! with the annotations of its queries, then both are reset. A query's
//! lines are never split across blocks because flushing only happens at
//! line boundaries.

use std::collections::HashSet;
use std::io::BufRead;
use std::io::Write;

use crate::Format;
use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::headers::block::BlockAnnotation;
use crate::headers::block::QueryRecord;
use crate::headers::block::write_block;
use crate::headers::file::FileHeader;
use crate::headers::file::write_file_header;
use crate::input::QueryIndex;
use crate::input::TargetIndex;
use crate::parser::consume_preamble;
use crate::parser::parse_line;

/// Upper bound on the number of cells in the pseudoalignment matrix.
pub const MAX_CELLS: u64 = 1 << 47;

/// Default for the number of hits that triggers writing a block.
pub const DEFAULT_BUFFER_SIZE: usize = 256_000;

/// Check that a matrix with the given dimensions can be packed.
pub fn check_input(n_queries: u64, n_targets: u64) -> Result<()> {
    match n_queries.checked_mul(n_targets) {
        Some(n_cells) if n_cells <= MAX_CELLS => Ok(()),
        _ => Err(Error::CapacityExceeded),
    }
}

/// Pack a plain-text pseudoalignment read from `conn_in` into `conn_out`
///
/// `queries` maps query names to matrix rows in order of appearance in the
/// sequencing data and `targets` maps target names to matrix columns in
/// the column order of `format`. `buffer_size` is the number of hits that
/// triggers flushing a block.
///
/// Nothing is written if the matrix dimensions exceed the supported
/// capacity. A query or target name missing from the indexes fails with
/// [Error::UnknownName] reporting the offending line.
///
pub fn pack<R: BufRead, W: Write>(
    format: &Format,
    queries: &QueryIndex,
    targets: &TargetIndex,
    buffer_size: usize,
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<()> {
    let n_queries = queries.len() as u64;
    let n_targets = targets.len() as u64;
    check_input(n_queries, n_targets)?;

    let header = FileHeader::new(format.clone(), n_queries, targets.names());
    write_file_header(&header, conn_out)?;

    let mut line_number = consume_preamble(format, targets, conn_in)?;

    let mut bits = Bitmap::new(n_queries * n_targets);
    let mut seen_queries: HashSet<u64> = HashSet::new();
    let mut n_in_buffer = 0;

    let mut line = String::new();
    loop {
        line.clear();
        if conn_in.read_line(&mut line)? == 0 {
            break;
        }
        line_number += 1;
        let contents = line.trim_end_matches(['\n', '\r']);
        if contents.is_empty() {
            continue;
        }

        n_in_buffer +=
            parse_line(format, contents, line_number, queries, targets, &mut bits, &mut seen_queries)?;

        if n_in_buffer > buffer_size {
            flush_block(&mut bits, &mut seen_queries, queries, conn_out)?;
            n_in_buffer = 0;
        }
    }

    // Write the remaining hits, skipping an empty trailing block
    if !seen_queries.is_empty() {
        flush_block(&mut bits, &mut seen_queries, queries, conn_out)?;
    }
    conn_out.flush()?;
    Ok(())
}

// Serializes the current buffer as one block and resets it. Queries with
// no name in the index are annotated with their row number.
fn flush_block<W: Write>(
    bits: &mut Bitmap,
    seen_queries: &mut HashSet<u64>,
    queries: &QueryIndex,
    conn_out: &mut W,
) -> Result<()> {
    bits.flush();
    let payload = bits.serialize()?;

    let mut positions: Vec<u64> = seen_queries.drain().collect();
    positions.sort_unstable();
    let records: Vec<QueryRecord> = positions
        .into_iter()
        .map(|pos| QueryRecord {
            query: queries.name(pos).map(str::to_string).unwrap_or_else(|| pos.to_string()),
            pos,
        })
        .collect();

    write_block(&BlockAnnotation { queries: records }, &payload, conn_out)?;
    bits.clear();
    Ok(())
}
