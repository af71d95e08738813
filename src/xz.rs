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

//! Self-delimiting .xz framing
//!
//! The packed file format embeds its metadata sections as standalone .xz
//! streams. A reader can recover the boundaries of a stream by scanning for
//! the stream footer, which means the sections never need a length prefix
//! and can grow or shrink between versions without breaking old readers.

use std::io::Read;
use std::io::Write;

use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::error::Error;
use crate::error::Result;

/// Magic bytes at the start of every .xz stream.
pub const XZ_STREAM_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Magic bytes terminating every .xz stream footer.
pub const XZ_FOOTER_MAGIC: [u8; 2] = [0x59, 0x5A];

const XZ_COMPRESSION_LEVEL: u32 = 6;

/// Compress `bytes` into a single standalone .xz stream.
pub fn compress_xz(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(Vec::new(), XZ_COMPRESSION_LEVEL);
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Decompress a standalone .xz stream captured with [scan_xz_stream].
pub fn decompress_xz(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = XzDecoder::new(bytes);
    let mut out: Vec<u8> = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Copy one .xz stream out of `conn`
///
/// Verifies the 6-byte stream magic at the current position of `conn`, then
/// copies bytes until the stream footer has been observed. `conn` is left
/// positioned at the first byte after the stream.
///
/// Returns the copied bytes, including the magic and the footer.
///
/// Errors with [Error::NotXz] if the magic is absent and [Error::Truncated]
/// if the input ends before the footer.
///
pub fn scan_xz_stream<R: Read>(conn: &mut R) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0; 6];
    conn.read_exact(&mut buffer).map_err(Error::from_read)?;
    if buffer != XZ_STREAM_MAGIC {
        return Err(Error::NotXz);
    }
    read_until_xz_end(conn, &mut buffer)?;
    Ok(buffer)
}

// The footer magic may also appear inside the compressed payload. Every
// section of an .xz stream is padded to a multiple of four bytes, so the
// pair is only accepted when it completes such a boundary; a false match
// that survives this filter still fails to decompress.
fn read_until_xz_end<R: Read>(conn: &mut R, out: &mut Vec<u8>) -> Result<()> {
    let mut byte: [u8; 1] = [0];
    loop {
        conn.read_exact(&mut byte).map_err(Error::from_read)?;
        out.push(byte[0]);
        let n_read = out.len();
        if byte[0] == XZ_FOOTER_MAGIC[1]
            && out[n_read - 2] == XZ_FOOTER_MAGIC[0]
            && n_read % 4 == 0
        {
            return Ok(());
        }
    }
}
