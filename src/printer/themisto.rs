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
use crate::alignment::RowCursor;
use crate::error::Result;

/// Format every matrix row in Themisto format
///
/// One line per query index in `[0, n_queries)`: the index followed by the
/// hit target indices, all space-terminated, newline-terminated even when
/// the row is empty.
///
pub fn format_all_rows<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let mut rows = alignment.rows();
    for read_id in 0..alignment.n_queries() {
        format_row(read_id, &mut rows, conn)?;
    }
    conn.flush()?;
    Ok(())
}

/// Format the annotated rows of one block in Themisto format.
pub fn format_annotated_rows<W: Write>(block: &Alignment, conn: &mut W) -> Result<()> {
    let mut rows = block.rows();
    for record in block.annotation_by_pos() {
        format_row(record.pos, &mut rows, conn)?;
    }
    conn.flush()?;
    Ok(())
}

fn format_row<I: Iterator<Item = u64>, W: Write>(
    read_id: u64,
    rows: &mut RowCursor<I>,
    conn: &mut W,
) -> Result<()> {
    let separator: char = ' ';
    let mut formatted: String = String::new();

    formatted += &read_id.to_string();
    formatted += &separator.to_string();
    for target_id in rows.hits(read_id) {
        formatted += &target_id.to_string();
        formatted += &separator.to_string();
    }
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_all_rows_keeps_empty_rows() {
        use crate::printer::tests::test_alignment;
        use super::format_all_rows;

        let alignment = test_alignment();

        let mut got: Vec<u8> = Vec::new();
        format_all_rows(&alignment, &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "0 0 2 \n1 \n");
    }

    #[test]
    fn format_annotated_rows_uses_block_rows() {
        use crate::Format;
        use crate::alignment::Alignment;
        use crate::headers::block::QueryRecord;
        use crate::headers::file::FileHeader;
        use super::format_annotated_rows;

        let targets = vec!["t0".to_string(), "t1".to_string()];
        let header = FileHeader::new(Format::Themisto, 100, &targets);

        let mut block = Alignment::new(&header).unwrap();
        block.bitmap_mut().bulk_insert(97 * 2 + 1).unwrap();
        block.bitmap_mut().flush();
        block.annotate(vec![QueryRecord { query: "97".to_string(), pos: 97 }]);

        let mut got: Vec<u8> = Vec::new();
        format_annotated_rows(&block, &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "97 1 \n");
    }
}
