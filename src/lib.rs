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

//! alignment-writer is a library and a command-line client for compressing
//! pseudoalignment data into a compact binary format and for converting the
//! packed data back into the plain-text formats output by common
//! pseudoalignment tools.
//!
//! A pseudoalignment is a sparse boolean matrix relating query sequences
//! (typically sequencing reads) to alignment targets (typically reference
//! sequences). alignment-writer stores the matrix as a compressed bitmap
//! split into independently decodable blocks, each framed by self-delimiting
//! .xz streams so that readers never need to know the size of a section in
//! advance.
//!
//! alignment-writer can read and write the following formats:
//!   - [Bifrost](https://github.com/pmelsted/bifrost)
//!   - [Fulgor](https://github.com/jermp/fulgor)
//!   - [Metagraph](https://github.com/ratschlab/metagraph)
//!   - [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf)
//!   - [Themisto](https://github.com/algbio/themisto)
//!
//! The main entry points are [pack::pack] for packing plain-text input,
//! [unpack::print_alignment] for unpacking into text,
//! [unpack::read_alignment] for materializing a packed file in memory, and
//! [unpack::StreamDecoder] for iterating over a packed file one block at a
//! time.
//!

use serde::{Deserialize, Serialize};

pub mod alignment;
pub mod bitmap;
pub mod error;
pub mod headers;
pub mod input;
pub mod pack;
pub mod parser;
pub mod printer;
pub mod unpack;
pub mod xz;

pub use crate::alignment::Alignment;
pub use crate::error::{Error, Result};
pub use crate::input::{QueryIndex, TargetIndex};
pub use crate::pack::pack;
pub use crate::unpack::{print_alignment, read_alignment, StreamDecoder};

/// Supported pseudoalignment formats
///
/// Stored in the file header as the `input_format` key with the same
/// spelling that [std::fmt::Display] produces.
///
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bifrost,
    Fulgor,
    Metagraph,
    #[serde(rename = "SAM")]
    SAM,
    Themisto,
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bifrost" => Ok(Format::Bifrost),
            "fulgor" => Ok(Format::Fulgor),
            "metagraph" => Ok(Format::Metagraph),
            "sam" => Ok(Format::SAM),
            "themisto" => Ok(Format::Themisto),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Format::Bifrost => write!(f, "bifrost"),
            Format::Fulgor => write!(f, "fulgor"),
            Format::Metagraph => write!(f, "metagraph"),
            Format::SAM => write!(f, "SAM"),
            Format::Themisto => write!(f, "themisto"),
        }
    }
}
