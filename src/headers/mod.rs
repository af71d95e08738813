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

//! Structured headers of the packed file format
//!
//! A packed file starts with one [file header](file::FileHeader) followed by
//! any number of blocks. Every header is JSON compressed into a standalone
//! .xz stream whose boundaries are recoverable by scanning (see
//! [xz](crate::xz)), so none of the variable-length sections need an
//! up-front size.
//!
//! File layout:
//!
//! ```text
//! [ file header        .xz stream ]
//! [ outer block header .xz stream ]  {"header_size": ..., "block_size": ...}
//! [ inner block header .xz stream ]  {"queries": [{"query": ..., "pos": ...}, ...]}
//! [ bitmap payload     raw bytes  ]  exactly block_size bytes
//! [ outer block header .xz stream ]
//! ...
//! ```
//!
//! The outer block header is itself variable length and therefore
//! self-delimiting; once parsed it gives the exact byte counts of the inner
//! header and the payload, which are then read without scanning.

pub mod block;
pub mod file;
