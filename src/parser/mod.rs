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

//! Reading pseudoalignments from supported plain-text formats
//!
//! All five formats share one contract: a parser interprets a single line,
//! marks every hit on it at the matrix position `query * n_targets + target`
//! through [Bitmap::bulk_insert](crate::bitmap::Bitmap::bulk_insert),
//! records the query row in the caller's set, and returns the number of
//! hits on the line.

// Format specific implementations
pub mod bifrost;
pub mod fulgor;
pub mod metagraph;
pub mod sam;
pub mod themisto;

use std::collections::HashSet;
use std::io::BufRead;

use crate::Format;
use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::input::QueryIndex;
use crate::input::TargetIndex;

/// Parse one line in `format`
///
/// Hits are inserted into `bits` and the query row is added to
/// `seen_queries`. `line_number` is 1-based and only used in error messages.
///
/// Returns the number of hits on the line.
///
pub fn parse_line(
    format: &Format,
    line: &str,
    line_number: usize,
    queries: &QueryIndex,
    targets: &TargetIndex,
    bits: &mut Bitmap,
    seen_queries: &mut HashSet<u64>,
) -> Result<usize> {
    match format {
        Format::Themisto => themisto::read_themisto(line, line_number, targets, bits, seen_queries),
        Format::Fulgor => fulgor::read_fulgor(line, line_number, queries, targets, bits, seen_queries),
        Format::Bifrost => bifrost::read_bifrost(line, line_number, queries, targets, bits, seen_queries),
        Format::Metagraph => metagraph::read_metagraph(line, line_number, queries, targets, bits, seen_queries),
        Format::SAM => sam::read_sam(line, line_number, queries, targets, bits, seen_queries),
    }
}

/// Consume any lines preceding the alignment data
///
/// Bifrost output starts with a column header line, which is validated
/// against the target index. SAM output starts with `@`-prefixed header
/// lines, which are skipped.
///
/// Returns the number of lines consumed.
///
pub fn consume_preamble<R: BufRead>(
    format: &Format,
    targets: &TargetIndex,
    conn: &mut R,
) -> Result<usize> {
    match format {
        Format::Bifrost => {
            let mut line = String::new();
            if conn.read_line(&mut line)? == 0 {
                return Err(Error::Truncated);
            }
            bifrost::check_preamble(line.trim_end_matches(['\n', '\r']), targets)?;
            Ok(1)
        }
        Format::SAM => {
            let mut n_consumed = 0;
            loop {
                let buf = conn.fill_buf()?;
                if buf.is_empty() || buf[0] != b'@' {
                    break;
                }
                let mut line = String::new();
                conn.read_line(&mut line)?;
                n_consumed += 1;
            }
            Ok(n_consumed)
        }
        _ => Ok(0),
    }
}
