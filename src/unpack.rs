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

//! Unpacking and decoding packed pseudoalignments
//!
//! All entry points share one skeleton: parse the file header, then loop
//! reading block header and payload pairs. The input stream is not
//! seekable, so reading stays on the calling thread; the already
//! materialized byte pairs are independent and are decoded on a bounded
//! worker pool when more than one thread is requested. Block bitmaps
//! OR-merge into the accumulator, which makes the result insensitive to
//! decode order.

use std::io;
use std::io::BufRead;
use std::io::Write;
use std::sync::mpsc;

use threadpool::ThreadPool;

use crate::Format;
use crate::alignment::Alignment;
use crate::error::Error;
use crate::error::Result;
use crate::headers::block::decode_block_annotation;
use crate::headers::block::read_block;
use crate::headers::file::FileHeader;
use crate::headers::file::read_file_header;
use crate::printer::Printer;

/// Decode one block into a standalone [Alignment]
///
/// `header_bytes` is the still-compressed inner block header and
/// `block_bytes` the raw bitmap payload, as returned by
/// [read_block](crate::headers::block::read_block).
///
pub fn decode_block(
    file_header: &FileHeader,
    header_bytes: &[u8],
    block_bytes: &[u8],
) -> Result<Alignment> {
    let mut block = Alignment::new(file_header)?;
    let annotation = decode_block_annotation(header_bytes)?;
    block.annotate(annotation.queries);
    block.bitmap_mut().deserialize_union(block_bytes)?;
    Ok(block)
}

// Reads blocks in batches of `n_threads`, decodes each batch on the pool,
// and hands the decoded blocks to `handle` in file order.
fn for_each_block<R: BufRead, F: FnMut(Alignment) -> Result<()>>(
    file_header: &FileHeader,
    n_threads: usize,
    conn: &mut R,
    mut handle: F,
) -> Result<()> {
    let n_threads = n_threads.max(1);
    let pool = ThreadPool::new(n_threads);

    // Workers from a failed batch may still be running; the pool is always
    // drained before the error surfaces.
    let result = dispatch_blocks(&pool, file_header, n_threads, conn, &mut handle);
    pool.join();
    result
}

fn dispatch_blocks<R: BufRead, F: FnMut(Alignment) -> Result<()>>(
    pool: &ThreadPool,
    file_header: &FileHeader,
    n_threads: usize,
    conn: &mut R,
    handle: &mut F,
) -> Result<()> {
    loop {
        // Read until every worker has a block to decode
        let mut batch: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(n_threads);
        while batch.len() < n_threads {
            match read_block(conn)? {
                Some(block) => batch.push(block),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }
        let n_in_batch = batch.len();

        let (tx, rx) = mpsc::channel::<(usize, Result<Alignment>)>();
        for (idx, (header_bytes, block_bytes)) in batch.into_iter().enumerate() {
            let tx = tx.clone();
            let file_header = file_header.clone();
            pool.execute(move || {
                let decoded = decode_block(&file_header, &header_bytes, &block_bytes);
                // Send fails only when the driver has already bailed out
                let _ = tx.send((idx, decoded));
            });
        }
        drop(tx);

        let mut decoded: Vec<Option<Alignment>> = (0..n_in_batch).map(|_| None).collect();
        for _ in 0..n_in_batch {
            let (idx, block) = rx.recv().map_err(|_| {
                Error::Io(io::Error::new(io::ErrorKind::Other, "block decoder disconnected"))
            })?;
            decoded[idx] = Some(block?);
        }
        for block in decoded.into_iter().flatten() {
            handle(block)?;
        }

        if n_in_batch < n_threads {
            break;
        }
    }

    Ok(())
}

/// Decode a packed pseudoalignment into memory
///
/// Reads the file header and OR-merges every block into one [Alignment],
/// decoding blocks on `n_threads` threads. The result is bit-identical for
/// any thread count.
///
pub fn read_alignment<R: BufRead>(conn: &mut R, n_threads: usize) -> Result<Alignment> {
    let file_header = read_file_header(conn)?;
    let mut alignment = Alignment::new(&file_header)?;

    for_each_block(&file_header, n_threads, conn, |block| {
        alignment.merge(block);
        Ok(())
    })?;

    Ok(alignment)
}

/// Unpack a packed pseudoalignment into plain text
///
/// Formats the data in `format`, which does not need to match the format
/// the file was packed from. Output is produced block by block so that at
/// most one decoded batch is held in memory; Bifrost output needs the full
/// matrix and falls back to decoding everything first.
///
pub fn print_alignment<R: BufRead, W: Write>(
    format: &Format,
    conn_in: &mut R,
    conn_out: &mut W,
    n_threads: usize,
) -> Result<()> {
    let file_header = read_file_header(conn_in)?;
    let mut printer = Printer::new(format.clone());

    if printer.streams() {
        for_each_block(&file_header, n_threads, conn_in, |block| {
            printer.format_block(&block, conn_out)
        })?;
    } else {
        let mut alignment = Alignment::new(&file_header)?;
        for_each_block(&file_header, n_threads, conn_in, |block| {
            alignment.merge(block);
            Ok(())
        })?;
        printer.format_full(&alignment, conn_out)?;
    }

    conn_out.flush()?;
    Ok(())
}

/// Iterator over the blocks of a packed pseudoalignment
///
/// Decodes one block per call without accumulating the full matrix. Each
/// item is a standalone [Alignment] holding the block's rows and
/// annotations.
///
pub struct StreamDecoder<'a, R: BufRead> {
    conn: &'a mut R,
    header: FileHeader,
    failed: bool,
}

impl<'a, R: BufRead> StreamDecoder<'a, R> {
    /// Parse the file header and position the decoder at the first block.
    pub fn new(conn: &'a mut R) -> Result<Self> {
        let header = read_file_header(conn)?;
        Ok(StreamDecoder { conn, header, failed: false })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.header
    }
}

impl<R: BufRead> Iterator for StreamDecoder<'_, R> {
    type Item = Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match read_block(self.conn) {
            Ok(Some((header_bytes, block_bytes))) => {
                let decoded = decode_block(&self.header, &header_bytes, &block_bytes);
                self.failed = decoded.is_err();
                Some(decoded)
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

// Tests
#[cfg(test)]
mod tests {

    fn pack_text(
        format: &crate::Format,
        query_names: &[&str],
        target_names: &[&str],
        buffer_size: usize,
        text: &[u8],
    ) -> Vec<u8> {
        use std::io::Cursor;
        use crate::input::{QueryIndex, TargetIndex};

        let queries = QueryIndex::from_names(query_names.iter().map(|x| x.to_string()));
        let targets = TargetIndex::from_names(target_names.iter().map(|x| x.to_string()));

        let mut packed: Vec<u8> = Vec::new();
        crate::pack::pack(format, &queries, &targets, buffer_size, &mut Cursor::new(text.to_vec()), &mut packed)
            .unwrap();
        packed
    }

    fn unpack_text(format: &crate::Format, packed: &[u8], n_threads: usize) -> String {
        use std::io::Cursor;
        use super::print_alignment;

        let mut out: Vec<u8> = Vec::new();
        print_alignment(format, &mut Cursor::new(packed.to_vec()), &mut out, n_threads).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn themisto_roundtrip() {
        use crate::Format;

        let packed = pack_text(
            &Format::Themisto,
            &["readA", "readB"],
            &["t0", "t1", "t2"],
            256000,
            b"0 0 2\n1\n",
        );

        let got = unpack_text(&Format::Themisto, &packed, 1);

        assert_eq!(got, "0 0 2 \n1 \n");
    }

    #[test]
    fn themisto_roundtrip_in_memory() {
        use std::io::Cursor;
        use crate::Format;
        use super::read_alignment;

        let packed = pack_text(
            &Format::Themisto,
            &["readA", "readB"],
            &["t0", "t1", "t2"],
            256000,
            b"0 0 2\n1\n",
        );

        let alignment = read_alignment(&mut Cursor::new(packed), 1).unwrap();

        assert_eq!(alignment.input_format(), &Format::Themisto);
        let positions: Vec<u64> = alignment.bitmap().iter().collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(alignment.annotation_by_pos()[0].query, "readA");
        assert_eq!(alignment.annotation_by_pos()[1].query, "readB");
    }

    #[test]
    fn bifrost_input_unpacks_as_themisto() {
        use crate::Format;

        let mut data: Vec<u8> = b"query_name\tt0\tt1\tt2\n".to_vec();
        data.append(&mut b"readA\t1\t0\t1\n".to_vec());
        data.append(&mut b"readB\t0\t0\t0\n".to_vec());

        let packed = pack_text(&Format::Bifrost, &["readA", "readB"], &["t0", "t1", "t2"], 256000, &data);

        let got = unpack_text(&Format::Themisto, &packed, 1);

        assert_eq!(got, "0 0 2 \n1 \n");
    }

    #[test]
    fn sam_unmapped_row_stays_empty() {
        use crate::Format;

        let mut data: Vec<u8> = b"readA\t0\tt1\t1\t60\t4M\t*\t0\t0\tACGT\tFFFF\n".to_vec();
        data.append(&mut b"readB\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tFFFF\n".to_vec());

        let packed = pack_text(&Format::SAM, &["readA", "readB"], &["t0", "t1"], 256000, &data);

        let got = unpack_text(&Format::Themisto, &packed, 1);

        assert_eq!(got, "0 1 \n1 \n");
    }

    #[test]
    fn fulgor_roundtrip() {
        use crate::Format;

        let mut data: Vec<u8> = b"ERR4035126.4996\t0\n".to_vec();
        data.append(&mut b"ERR4035126.1262953\t1\t0\n".to_vec());
        data.append(&mut b"ERR4035126.651965\t2\t0\t1\n".to_vec());

        let packed = pack_text(
            &Format::Fulgor,
            &["ERR4035126.4996", "ERR4035126.1262953", "ERR4035126.651965"],
            &["chr.fasta", "plasmid.fasta"],
            256000,
            &data,
        );

        let got = unpack_text(&Format::Fulgor, &packed, 1);

        assert_eq!(
            got,
            "ERR4035126.4996\t0\nERR4035126.1262953\t1\t0\nERR4035126.651965\t2\t0\t1\n"
        );
    }

    #[test]
    fn metagraph_roundtrip() {
        use crate::Format;

        let mut data: Vec<u8> = b"0\tERR4035126.2\tchr.fasta\n".to_vec();
        data.append(&mut b"1\tERR4035126.16\t\n".to_vec());
        data.append(&mut b"2\tERR4035126.651903\tchr.fasta:plasmid.fasta\n".to_vec());

        let packed = pack_text(
            &Format::Metagraph,
            &["ERR4035126.2", "ERR4035126.16", "ERR4035126.651903"],
            &["chr.fasta", "plasmid.fasta"],
            256000,
            &data,
        );

        let got = unpack_text(&Format::Metagraph, &packed, 1);

        assert_eq!(
            got,
            "0\tERR4035126.2\tchr.fasta\n1\tERR4035126.16\t\n2\tERR4035126.651903\tchr.fasta:plasmid.fasta\n"
        );
    }

    #[test]
    fn sam_output_prints_the_prelude_once() {
        use crate::Format;

        // Tiny buffer so each query row lands in its own block
        let packed = pack_text(&Format::Themisto, &["readA", "readB"], &["t0", "t1"], 0, b"0 1\n1\n");

        let got = unpack_text(&Format::SAM, &packed, 1);

        let expected = format!(
            "@SQ\tSN:t0\n@SQ\tSN:t1\n@PG\tID:themisto\tPN:alignment-writer\tVN:{}\n\
             readA\t0\tt1\t1\t255\t*\t*\t0\t0\t*\t*\n\
             readB\t0\t*\t0\t255\t*\t*\t0\t0\t*\t*\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(got, expected);
    }

    #[test]
    fn bifrost_output_falls_back_to_full_decode() {
        use crate::Format;

        let mut data: Vec<u8> = b"query_name\tt0\tt1\n".to_vec();
        data.append(&mut b"readA\t1\t0\n".to_vec());
        data.append(&mut b"readB\t0\t1\n".to_vec());

        // Tiny buffer forces one block per query row
        let packed = pack_text(&Format::Bifrost, &["readA", "readB"], &["t0", "t1"], 0, &data);

        let got = unpack_text(&Format::Bifrost, &packed, 2);

        assert_eq!(got, "query_name\tt0\tt1\nreadA\t1\t0\nreadB\t0\t1\n");
    }

    #[test]
    fn block_size_does_not_change_the_matrix() {
        use std::io::Cursor;
        use crate::Format;
        use super::read_alignment;

        let data = b"0 0 2\n1 1\n2 0 1 2\n3\n4 2\n";

        let queries = ["r0", "r1", "r2", "r3", "r4"];
        let small = pack_text(&Format::Themisto, &queries, &["t0", "t1", "t2"], 1, data);
        let large = pack_text(&Format::Themisto, &queries, &["t0", "t1", "t2"], 100000, data);

        let from_small = read_alignment(&mut Cursor::new(small), 1).unwrap();
        let from_large = read_alignment(&mut Cursor::new(large), 1).unwrap();

        let small_positions: Vec<u64> = from_small.bitmap().iter().collect();
        let large_positions: Vec<u64> = from_large.bitmap().iter().collect();
        assert_eq!(small_positions, large_positions);
    }

    #[test]
    fn duplicated_block_streams_or_to_the_same_matrix() {
        use std::io::Cursor;
        use crate::Format;
        use crate::headers::file::read_file_header;
        use super::read_alignment;

        let packed = pack_text(&Format::Themisto, &["r0", "r1"], &["t0", "t1", "t2"], 1, b"0 0 2\n1 1\n");

        // Append a second copy of the block section under the same file header
        let mut conn = Cursor::new(packed.clone());
        read_file_header(&mut conn).unwrap();
        let blocks_start = conn.position() as usize;
        let mut doubled = packed.clone();
        doubled.extend_from_slice(&packed[blocks_start..]);

        let once = read_alignment(&mut Cursor::new(packed), 1).unwrap();
        let twice = read_alignment(&mut Cursor::new(doubled), 1).unwrap();

        let once_positions: Vec<u64> = once.bitmap().iter().collect();
        let twice_positions: Vec<u64> = twice.bitmap().iter().collect();
        assert_eq!(once_positions, twice_positions);
    }

    #[test]
    fn parallel_unpack_matches_serial() {
        use std::io::Cursor;
        use crate::Format;
        use super::read_alignment;

        // Small buffer so the file holds one block per input line
        let data = b"0 0 2\n1 1\n2 0 1 2\n3 2\n4 0\n5 1 2\n6 0 2\n7 1\n";
        let queries = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];
        let packed = pack_text(&Format::Themisto, &queries, &["t0", "t1", "t2"], 1, data);

        let serial = read_alignment(&mut Cursor::new(packed.clone()), 1).unwrap();
        let parallel = read_alignment(&mut Cursor::new(packed), 4).unwrap();

        let serial_positions: Vec<u64> = serial.bitmap().iter().collect();
        let parallel_positions: Vec<u64> = parallel.bitmap().iter().collect();
        assert_eq!(serial_positions, parallel_positions);
        assert_eq!(serial.annotation().len(), parallel.annotation().len());
    }

    #[test]
    fn parallel_print_keeps_file_order() {
        use crate::Format;

        let data = b"0 0\n1 1\n2 2\n3 0\n4 1\n5 2\n";
        let queries = ["r0", "r1", "r2", "r3", "r4", "r5"];
        let packed = pack_text(&Format::Themisto, &queries, &["t0", "t1", "t2"], 0, data);

        let got = unpack_text(&Format::Themisto, &packed, 3);

        assert_eq!(got, "0 0 \n1 1 \n2 2 \n3 0 \n4 1 \n5 2 \n");
    }

    #[test]
    fn prefix_at_a_block_boundary_is_a_valid_file() {
        use std::io::Cursor;
        use crate::Format;
        use crate::headers::block::read_block;
        use crate::headers::file::read_file_header;
        use super::read_alignment;

        let data = b"0 0\n1 1\n2 2\n";
        let packed = pack_text(&Format::Themisto, &["r0", "r1", "r2"], &["t0", "t1", "t2"], 0, data);

        // Find the boundary after the first block
        let mut conn = Cursor::new(packed.clone());
        read_file_header(&mut conn).unwrap();
        read_block(&mut conn).unwrap().unwrap();
        let boundary = conn.position() as usize;

        let prefix = packed[0..boundary].to_vec();
        let alignment = read_alignment(&mut Cursor::new(prefix), 1).unwrap();

        let positions: Vec<u64> = alignment.bitmap().iter().collect();
        assert_eq!(positions, vec![0]);
        assert_eq!(alignment.annotation().len(), 1);
    }

    #[test]
    fn stream_decoder_yields_one_alignment_per_block() {
        use std::io::Cursor;
        use crate::Format;
        use super::StreamDecoder;

        let data = b"0 0\n1 1\n2 2\n";
        let packed = pack_text(&Format::Themisto, &["r0", "r1", "r2"], &["t0", "t1", "t2"], 0, data);

        let mut conn = Cursor::new(packed);
        let decoder = StreamDecoder::new(&mut conn).unwrap();
        assert_eq!(decoder.file_header().n_queries, 3);

        let blocks: Vec<crate::Alignment> = decoder.map(|block| block.unwrap()).collect();

        assert_eq!(blocks.len(), 3);
        for (idx, block) in blocks.iter().enumerate() {
            let positions: Vec<u64> = block.bitmap().iter().collect();
            assert_eq!(positions, vec![(idx * 3 + idx) as u64]);
            assert_eq!(block.annotation()[0].pos, idx as u64);
        }
    }

    #[test]
    fn truncated_file_is_detected() {
        use std::io::Cursor;
        use crate::Format;
        use crate::error::Error;
        use super::read_alignment;

        let packed = pack_text(&Format::Themisto, &["r0"], &["t0"], 256000, b"0 0\n");
        let truncated = packed[0..(packed.len() - 5)].to_vec();

        let got = read_alignment(&mut Cursor::new(truncated), 1);

        assert!(matches!(got, Err(Error::Truncated)));
    }

    #[test]
    fn garbage_input_is_a_malformed_frame() {
        use std::io::Cursor;
        use crate::error::Error;
        use super::read_alignment;

        let got = read_alignment(&mut Cursor::new(b"128 0 7 11 3\n".to_vec()), 1);

        assert!(matches!(got, Err(Error::MalformedFrame)));
    }
}
