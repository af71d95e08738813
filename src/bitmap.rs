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

//! Compressed bitmap over the flattened pseudoalignment matrix
//!
//! The matrix cell for query `i` and target `j` lives at the 1-D position
//! `i * n_targets + j`. Positions are stored in a [RoaringTreemap], which
//! compresses well for the sparse matrices pseudoaligners produce and
//! supports the set-union deserialization that block decoding relies on.

use roaring::RoaringTreemap;

use crate::error::Error;
use crate::error::Result;

// Inserts are buffered and published in sorted batches.
const INSERT_BUFFER_LEN: usize = 8192;

/// Sparse bit matrix with a fixed logical capacity
///
/// The capacity is the number of cells in the matrix. Inserting at or past
/// the capacity fails with [Error::CapacityExceeded].
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bitmap {
    bits: RoaringTreemap,
    buffer: Vec<u64>,
    capacity: u64,
}

impl Bitmap {
    /// Construct an empty bitmap with room for `capacity` bits.
    pub fn new(capacity: u64) -> Self {
        Bitmap { bits: RoaringTreemap::new(), buffer: Vec::new(), capacity }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of set bits, not counting unflushed inserts.
    pub fn count_ones(&self) -> u64 {
        self.bits.len()
    }

    /// Mark `position`
    ///
    /// Inserts are buffered; call [flush](Bitmap::flush) to make all
    /// preceding inserts visible to the other operations.
    ///
    pub fn bulk_insert(&mut self, position: u64) -> Result<()> {
        if position >= self.capacity {
            return Err(Error::CapacityExceeded);
        }
        self.buffer.push(position);
        if self.buffer.len() >= INSERT_BUFFER_LEN {
            self.flush();
        }
        Ok(())
    }

    /// Publish all buffered inserts.
    pub fn flush(&mut self) {
        self.buffer.sort_unstable();
        for position in self.buffer.drain(..) {
            self.bits.insert(position);
        }
    }

    /// Set-union with `other`, in place.
    pub fn or_in_place(&mut self, other: &Bitmap) {
        self.bits |= &other.bits;
    }

    /// Ascending iterator over the set positions.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.bits.iter()
    }

    /// Serialize the set positions into a standalone byte buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut bytes: Vec<u8> = Vec::new();
        self.bits.serialize_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserialize `bytes` into this bitmap
    ///
    /// The effect is a set-union with the serialized contents, so
    /// deserializing multiple blocks accumulates the OR over all of them.
    ///
    pub fn deserialize_union(&mut self, bytes: &[u8]) -> Result<()> {
        let other = RoaringTreemap::deserialize_from(bytes)
            .map_err(|e| Error::CorruptPayload(e.to_string()))?;
        if other.max().is_some_and(|max| max >= self.capacity) {
            return Err(Error::CorruptPayload(
                "serialized bitmap does not fit in the alignment dimensions".to_string(),
            ));
        }
        self.bits |= other;
        Ok(())
    }

    /// Drop all set bits and buffered inserts, keeping the capacity.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.buffer.clear();
    }
}
