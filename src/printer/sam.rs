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
use std::io::Write;

use crate::alignment::Alignment;
use crate::error::Result;

/// Format the SAM header block
///
/// One `@SQ` line per target in column order, then a `@PG` line recording
/// the format the data was originally packed from.
///
pub fn format_prelude<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let mut formatted: String = String::new();
    for name in alignment.target_names() {
        formatted += "@SQ\tSN:";
        formatted += name;
        formatted += "\n";
    }
    formatted += "@PG\tID:";
    formatted += &alignment.input_format().to_string();
    formatted += "\tPN:alignment-writer\tVN:";
    formatted += env!("CARGO_PKG_VERSION");
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format the annotated rows in SAM format
///
/// One alignment record per hit; a query with no hits emits a single
/// unmapped record with `*` as the reference name.
///
pub fn format_rows<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let separator: char = '\t';
    let target_names = alignment.target_names();
    let mut rows = alignment.rows();

    for record in alignment.annotation_by_pos() {
        let hits = rows.hits(record.pos);

        let mut formatted: String = String::new();
        if hits.is_empty() {
            formatted += &record.query;
            formatted += &separator.to_string();
            formatted += "0\t*\t0\t255\t*\t*\t0\t0\t*\t*\n";
        } else {
            for target_id in hits {
                formatted += &record.query;
                formatted += &separator.to_string();
                formatted += "0\t";
                formatted += &target_names[target_id as usize];
                formatted += "\t1\t255\t*\t*\t0\t0\t*\t*\n";
            }
        }

        conn.write_all(formatted.as_bytes())?;
    }
    conn.flush()?;
    Ok(())
}
