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
use std::io::BufRead;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::error::Result;
use crate::xz::compress_xz;
use crate::xz::decompress_xz;
use crate::xz::scan_xz_stream;

/// Outer block header
///
/// Carries the exact byte counts of the inner block header and the bitmap
/// payload that follow it.
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockHeader {
    pub header_size: u64,
    pub block_size: u64,
}

/// Name and matrix row of one query annotated in a block.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryRecord {
    pub query: String,
    pub pos: u64,
}

/// Inner block header: the queries whose rows appear in the block.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockAnnotation {
    pub queries: Vec<QueryRecord>,
}

/// Write one block
///
/// Writes the outer block header and the inner block header as standalone
/// .xz streams, followed by the raw bitmap payload.
///
pub fn write_block<W: Write>(
    annotation: &BlockAnnotation,
    payload: &[u8],
    conn: &mut W,
) -> Result<()> {
    let json = serde_json::to_vec(annotation).map_err(|e| Error::MalformedHeader(e.to_string()))?;
    let inner = compress_xz(&json)?;

    let outer = BlockHeader { header_size: inner.len() as u64, block_size: payload.len() as u64 };
    let outer_json =
        serde_json::to_vec(&outer).map_err(|e| Error::MalformedHeader(e.to_string()))?;

    conn.write_all(&compress_xz(&outer_json)?)?;
    conn.write_all(&inner)?;
    conn.write_all(payload)?;
    Ok(())
}

/// Read the next block
///
/// Returns the still-compressed inner block header and the raw bitmap
/// payload, or `None` if `conn` is exhausted.
///
pub fn read_block<R: BufRead>(conn: &mut R) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
    if conn.fill_buf()?.is_empty() {
        return Ok(None);
    }

    let stream = scan_xz_stream(conn).map_err(|e| match e {
        Error::NotXz => Error::MalformedFrame,
        other => other,
    })?;
    let json = decompress_xz(&stream)?;
    let header: BlockHeader =
        serde_json::from_slice(&json).map_err(|e| Error::MalformedHeader(e.to_string()))?;

    let mut inner: Vec<u8> = vec![0; header.header_size as usize];
    conn.read_exact(&mut inner).map_err(Error::from_read)?;

    let mut payload: Vec<u8> = vec![0; header.block_size as usize];
    conn.read_exact(&mut payload).map_err(Error::from_read)?;

    Ok(Some((inner, payload)))
}

/// Decompress and parse an inner block header captured by [read_block].
pub fn decode_block_annotation(inner: &[u8]) -> Result<BlockAnnotation> {
    let json = decompress_xz(inner)?;
    serde_json::from_slice(&json).map_err(|e| Error::MalformedHeader(e.to_string()))
}
