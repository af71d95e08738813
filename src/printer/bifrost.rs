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

/// Format the Bifrost column header line
///
/// `query_name` followed by the target names in column order,
/// tab-separated.
///
pub fn format_header<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let separator: char = '\t';
    let mut formatted: String = String::from("query_name");

    for name in alignment.target_names() {
        formatted += &separator.to_string();
        formatted += name;
    }
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format the annotated rows in Bifrost format
///
/// One line per annotated query, in ascending row order: the query name
/// followed by a presence flag for every target column.
///
pub fn format_rows<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let separator: char = '\t';
    let n_targets = alignment.n_targets() as usize;
    let mut rows = alignment.rows();

    for record in alignment.annotation_by_pos() {
        let mut flags: Vec<bool> = vec![false; n_targets];
        for target_id in rows.hits(record.pos) {
            flags[target_id as usize] = true;
        }

        let mut formatted: String = String::new();
        formatted += &record.query;
        for flag in flags {
            formatted += &separator.to_string();
            formatted += if flag { "1" } else { "0" };
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
    fn format_header_lists_targets_in_column_order() {
        use crate::printer::tests::test_alignment;
        use super::format_header;

        let alignment = test_alignment();

        let mut got: Vec<u8> = Vec::new();
        format_header(&alignment, &mut got).unwrap();

        assert_eq!(
            String::from_utf8(got).unwrap(),
            "query_name\tchr.fasta\tplasmid.fasta\tphage.fasta\n"
        );
    }

    #[test]
    fn format_rows_writes_dense_flags() {
        use crate::printer::tests::test_alignment;
        use super::format_rows;

        let alignment = test_alignment();

        let mut got: Vec<u8> = Vec::new();
        format_rows(&alignment, &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "readA\t1\t0\t1\nreadB\t0\t0\t0\n");
    }
}
