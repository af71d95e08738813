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
use std::iter::Peekable;

use crate::Format;
use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::headers::block::QueryRecord;
use crate::headers::file::FileHeader;
use crate::pack::MAX_CELLS;

/// A decoded pseudoalignment
///
/// Owns the bit matrix sized `n_queries * n_targets`, the target names in
/// column order, the union of the query annotations collected from decoded
/// block headers, and the format tag the data was originally packed from.
///
#[derive(Clone, Debug)]
pub struct Alignment {
    bits: Bitmap,
    n_queries: u64,
    n_targets: u64,
    target_names: Vec<String>,
    queries: Vec<QueryRecord>,
    input_format: Format,
}

impl Alignment {
    /// Construct an empty alignment with the dimensions, target names, and
    /// format tag recorded in a file header.
    pub fn new(header: &FileHeader) -> Result<Self> {
        let n_cells = header
            .n_queries
            .checked_mul(header.n_targets)
            .filter(|n| *n <= MAX_CELLS)
            .ok_or(Error::CapacityExceeded)?;

        Ok(Alignment {
            bits: Bitmap::new(n_cells),
            n_queries: header.n_queries,
            n_targets: header.n_targets,
            target_names: header.target_names()?,
            queries: Vec::new(),
            input_format: header.input_format.clone(),
        })
    }

    pub fn n_queries(&self) -> u64 {
        self.n_queries
    }

    pub fn n_targets(&self) -> u64 {
        self.n_targets
    }

    /// Target names in column order.
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    /// Query annotations in the order the blocks were decoded.
    pub fn annotation(&self) -> &[QueryRecord] {
        &self.queries
    }

    /// Query annotations sorted by matrix row.
    pub fn annotation_by_pos(&self) -> Vec<&QueryRecord> {
        let mut sorted: Vec<&QueryRecord> = self.queries.iter().collect();
        sorted.sort_by_key(|record| record.pos);
        sorted
    }

    pub fn input_format(&self) -> &Format {
        &self.input_format
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bits
    }

    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bits
    }

    /// Append query annotations decoded from a block header.
    pub fn annotate(&mut self, mut records: Vec<QueryRecord>) {
        self.queries.append(&mut records);
    }

    /// Fold the bits and annotations of `other` into this alignment
    ///
    /// The bitmaps are OR-merged and the annotations concatenated, so
    /// merging is insensitive to the order the blocks were decoded in.
    ///
    pub fn merge(&mut self, other: Alignment) {
        self.bits.or_in_place(&other.bits);
        self.queries.extend(other.queries);
    }

    /// Forward cursor over the rows of the matrix.
    pub fn rows(&self) -> RowCursor<impl Iterator<Item = u64> + '_> {
        RowCursor::new(self.bits.iter(), self.n_targets)
    }
}

/// Single-pass cursor yielding the hits of each matrix row
///
/// Rows must be requested in ascending order; the positions of the
/// underlying enumeration are consumed exactly once.
///
pub struct RowCursor<I: Iterator<Item = u64>> {
    positions: Peekable<I>,
    n_targets: u64,
}

impl<I: Iterator<Item = u64>> RowCursor<I> {
    pub fn new(positions: I, n_targets: u64) -> Self {
        RowCursor { positions: positions.peekable(), n_targets }
    }

    /// Target columns set on `row`, in ascending order.
    pub fn hits(&mut self, row: u64) -> Vec<u64> {
        let start = row * self.n_targets;
        let end = start + self.n_targets;
        while self.positions.next_if(|pos| *pos < start).is_some() {}

        let mut hits: Vec<u64> = Vec::new();
        while let Some(pos) = self.positions.next_if(|pos| *pos < end) {
            hits.push(pos - start);
        }
        hits
    }
}

// Tests
#[cfg(test)]
mod tests {

    fn test_header() -> crate::headers::file::FileHeader {
        use crate::Format;
        use crate::headers::file::FileHeader;

        let targets = vec!["chr.fasta".to_string(), "plasmid.fasta".to_string(), "phage.fasta".to_string()];
        FileHeader::new(Format::Themisto, 4, &targets)
    }

    #[test]
    fn new_from_file_header() {
        use super::Alignment;
        use crate::Format;

        let alignment = Alignment::new(&test_header()).unwrap();

        assert_eq!(alignment.n_queries(), 4);
        assert_eq!(alignment.n_targets(), 3);
        assert_eq!(alignment.bitmap().capacity(), 12);
        assert_eq!(alignment.input_format(), &Format::Themisto);
        assert_eq!(alignment.target_names()[1], "plasmid.fasta");
    }

    #[test]
    fn oversized_header_is_rejected() {
        use super::Alignment;
        use crate::Format;
        use crate::error::Error;
        use crate::headers::file::FileHeader;

        let header = FileHeader {
            n_queries: 1 << 24,
            n_targets: 1 << 24,
            input_format: Format::Themisto,
            targets: Vec::new(),
        };

        assert!(matches!(Alignment::new(&header), Err(Error::CapacityExceeded)));
    }

    #[test]
    fn merge_is_or_plus_concatenation() {
        use super::Alignment;
        use crate::headers::block::QueryRecord;

        let mut a = Alignment::new(&test_header()).unwrap();
        a.bitmap_mut().bulk_insert(0).unwrap();
        a.bitmap_mut().flush();
        a.annotate(vec![QueryRecord { query: "readA".to_string(), pos: 0 }]);

        let mut b = Alignment::new(&test_header()).unwrap();
        b.bitmap_mut().bulk_insert(5).unwrap();
        b.bitmap_mut().flush();
        b.annotate(vec![QueryRecord { query: "readB".to_string(), pos: 1 }]);

        a.merge(b);

        let positions: Vec<u64> = a.bitmap().iter().collect();
        assert_eq!(positions, vec![0, 5]);
        assert_eq!(a.annotation().len(), 2);
        assert_eq!(a.annotation_by_pos()[1].query, "readB");
    }

    #[test]
    fn row_cursor_yields_hits_per_row() {
        use super::Alignment;

        let mut alignment = Alignment::new(&test_header()).unwrap();
        for pos in [0, 2, 5, 9, 10, 11] {
            alignment.bitmap_mut().bulk_insert(pos).unwrap();
        }
        alignment.bitmap_mut().flush();

        let mut rows = alignment.rows();
        assert_eq!(rows.hits(0), vec![0, 2]);
        assert_eq!(rows.hits(1), vec![2]);
        assert_eq!(rows.hits(2), Vec::<u64>::new());
        assert_eq!(rows.hits(3), vec![0, 1, 2]);
    }

    #[test]
    fn row_cursor_skips_unrequested_rows() {
        use super::Alignment;

        let mut alignment = Alignment::new(&test_header()).unwrap();
        for pos in [0, 4, 10] {
            alignment.bitmap_mut().bulk_insert(pos).unwrap();
        }
        alignment.bitmap_mut().flush();

        let mut rows = alignment.rows();
        assert_eq!(rows.hits(3), vec![1]);
    }
}
