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

/// Format the annotated rows in Fulgor format
///
/// One line per annotated query, in ascending row order: the query name,
/// the number of hits, and the hit target indices, tab-separated. A row
/// with no hits terminates after the count.
///
pub fn format_rows<W: Write>(alignment: &Alignment, conn: &mut W) -> Result<()> {
    let separator: char = '\t';
    let mut rows = alignment.rows();

    for record in alignment.annotation_by_pos() {
        let hits = rows.hits(record.pos);

        let mut formatted: String = String::new();
        formatted += &record.query;
        formatted += &separator.to_string();
        formatted += &hits.len().to_string();
        for target_id in &hits {
            formatted += &separator.to_string();
            formatted += &target_id.to_string();
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
    fn format_rows_lists_count_then_targets() {
        use crate::printer::tests::test_alignment;
        use super::format_rows;

        let alignment = test_alignment();

        let mut got: Vec<u8> = Vec::new();
        format_rows(&alignment, &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "readA\t2\t0\t2\nreadB\t0\n");
    }

    #[test]
    fn rows_print_in_ascending_order_regardless_of_annotation_order() {
        use crate::Format;
        use crate::alignment::Alignment;
        use crate::headers::block::QueryRecord;
        use crate::headers::file::FileHeader;
        use super::format_rows;

        let targets = vec!["t0".to_string(), "t1".to_string()];
        let header = FileHeader::new(Format::Fulgor, 2, &targets);

        let mut alignment = Alignment::new(&header).unwrap();
        alignment.bitmap_mut().bulk_insert(0).unwrap();
        alignment.bitmap_mut().bulk_insert(3).unwrap();
        alignment.bitmap_mut().flush();
        alignment.annotate(vec![
            QueryRecord { query: "readB".to_string(), pos: 1 },
            QueryRecord { query: "readA".to_string(), pos: 0 },
        ]);

        let mut got: Vec<u8> = Vec::new();
        format_rows(&alignment, &mut got).unwrap();

        assert_eq!(String::from_utf8(got).unwrap(), "readA\t1\t0\nreadB\t1\t1\n");
    }
}
