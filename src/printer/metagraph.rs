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

/// Format the annotated rows in Metagraph format
///
/// One line per annotated query, in ascending row order: the matrix row,
/// the query name, and the hit target names separated by `:`. The field
/// separator before the target names is written even when the row is
/// empty.
///
pub fn format_rows<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let separator: char = '\t';
    let target_names = alignment.target_names();
    let mut rows = alignment.rows();

    for record in alignment.annotation_by_pos() {
        let mut formatted: String = String::new();
        formatted += &record.pos.to_string();
        formatted += &separator.to_string();
        formatted += &record.query;
        formatted += &separator.to_string();

        let mut first = true;
        for target_id in rows.hits(record.pos) {
            if !first {
                formatted += ":";
            }
            first = false;
            formatted += &target_names[target_id as usize];
        }
        formatted += "\n";

        conn.write_all(formatted.as_bytes())?;
    }
    conn.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_rows_joins_target_names() {
        use crate::printer::tests::test_alignment;
        use super::format_rows;

        let alignment = test_alignment();

        let mut got: Vec<u8> = Vec::new();
        format_rows(&alignment, &mut got).unwrap();

        assert_eq!(
            String::from_utf8(got).unwrap(),
            "0\treadA\tchr.fasta:phage.fasta\n1\treadB\t\n"
        );
    }
}
