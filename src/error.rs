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
use std::io;

/// Result type used throughout the crate, wrapping [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by packing, unpacking, and the codec internals.
///
/// All variants are fatal: the operation that produced them is abandoned and
/// any partially written output should be considered invalid.
///
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pseudoalignment matrix does not fit in the supported address space.
    #[error("input size exceeds maximum capacity (number of queries x number of targets > 2^47)")]
    CapacityExceeded,

    /// An unrecognized format name was requested.
    #[error("'{0}' is not a recognized pseudoalignment format")]
    UnknownFormat(String),

    /// A parser encountered a query or target name that is not in its index.
    #[error("unknown name '{name}' on input line {line}")]
    UnknownName { name: String, line: usize },

    /// A line could not be interpreted in the requested format.
    #[error("malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// Bytes at the current position do not start with an .xz stream header.
    #[error("input does not start with an .xz stream header")]
    NotXz,

    /// An .xz stream was expected at a frame boundary but not found.
    #[error("expected an .xz stream at a frame boundary")]
    MalformedFrame,

    /// The input ended before a required byte count or stream footer.
    #[error("unexpected end of input")]
    Truncated,

    /// A file or block header did not parse or lacked required contents.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A serialized bitmap payload could not be deserialized.
    #[error("corrupt block payload: {0}")]
    CorruptPayload(String),

    /// An underlying reader or writer failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Converts a short read into [Error::Truncated], passing other I/O
    /// failures through unchanged.
    pub(crate) fn from_read(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated
        } else {
            Error::Io(e)
        }
    }
}
