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

//! Writing pseudoalignments in the supported plain-text formats
//!
//! Printers traverse the alignment bitmap through a single forward
//! [row cursor](crate::alignment::RowCursor); enumeration yields positions
//! in ascending order, so the hits of each row come out contiguously.
//!
//! Two modes are supported. Full output formats a completely decoded
//! [Alignment], visiting every matrix row. Block output formats one decoded
//! block at a time and only visits the rows annotated in that block; this
//! is what keeps streaming decode memory-bounded. Bifrost output is a dense
//! matrix over all queries and therefore has no block mode.

// Format specific implementations
pub mod bifrost;
pub mod fulgor;
pub mod metagraph;
pub mod sam;
pub mod themisto;

use std::io::Write;

use crate::Format;
use crate::alignment::Alignment;
use crate::error::Result;

/// Formats decoded alignments in the chosen output format.
pub struct Printer {
    format: Format,
    prelude_done: bool,
}

impl Printer {
    pub fn new(format: Format) -> Self {
        Printer { format, prelude_done: false }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// True when the output format supports per-block printing.
    pub fn streams(&self) -> bool {
        !matches!(self.format, Format::Bifrost)
    }

    /// Format a completely decoded alignment.
    pub fn format_full<W: Write>(&mut self, alignment: &Alignment, conn: &mut W) -> Result<()> {
        match self.format {
            Format::Themisto => themisto::format_all_rows(alignment, conn),
            Format::Fulgor => fulgor::format_rows(alignment, conn),
            Format::Metagraph => metagraph::format_rows(alignment, conn),
            Format::Bifrost => {
                bifrost::format_header(alignment, conn)?;
                bifrost::format_rows(alignment, conn)
            }
            Format::SAM => {
                sam::format_prelude(alignment, conn)?;
                sam::format_rows(alignment, conn)
            }
        }
    }

    /// Format one decoded block, emitting only the rows annotated in it
    ///
    /// The SAM prelude is emitted before the first block only. Calling this
    /// with Bifrost output formats the block as a full alignment; use
    /// [streams](Printer::streams) to pick the decode strategy first.
    ///
    pub fn format_block<W: Write>(&mut self, block: &Alignment, conn: &mut W) -> Result<()> {
        match self.format {
            Format::Themisto => themisto::format_annotated_rows(block, conn),
            Format::Fulgor => fulgor::format_rows(block, conn),
            Format::Metagraph => metagraph::format_rows(block, conn),
            Format::SAM => {
                if !self.prelude_done {
                    sam::format_prelude(block, conn)?;
                    self.prelude_done = true;
                }
                sam::format_rows(block, conn)
            }
            Format::Bifrost => self.format_full(block, conn),
        }
    }
}
