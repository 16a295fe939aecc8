//! Decoding of byte addresses into matrix coordinates and cache address fields.
//!
//! A cache address is read most- to least-significant as `[ tag | index | offset ]`:
//! the lowest `offset_bits` select a byte within a line, the next `index_bits`
//! select a set, and whatever remains is the tag.
//!
//! None of these functions validate their arguments. Shifts that reach past the
//! width of a `u64` are defined to produce zero, so every field extractor is
//! total. See [`crate::matrix::MatrixLayout`] and [`crate::geometry::CacheGeometry`]
//! for checked wrappers.

use std::fmt;

use crate::utils::low_mask;

/// Size in bytes of one matrix element (a 32-bit word).
pub const MATRIX_ELEMENT_BYTES: u64 = 4;

/// Splits the word offset of `addr` from `base` into `(row, col)` with
/// `num_rows` elements between row boundaries.
///
/// `addr - base` is expected to be a non-negative multiple of
/// [`MATRIX_ELEMENT_BYTES`]; anything else gives a meaningless coordinate.
/// An `addr` below `base` wraps instead of panicking.
///
/// # Panics
///
/// Panics when `num_rows` is zero.
pub fn compute_matrix_index(num_rows: u64, addr: u64, base: u64) -> (u64, u64) {
    let offset = addr.wrapping_sub(base) / MATRIX_ELEMENT_BYTES;
    (offset / num_rows, offset % num_rows)
}

/// Set index: the `index_bits` bits sitting directly above the block offset.
pub fn compute_set_index(index_bits: u32, offset_bits: u32, addr: u64) -> u64 {
    addr.checked_shr(offset_bits).unwrap_or(0) & low_mask(index_bits)
}

/// Tag: everything above the index and offset fields.
pub fn compute_tag(index_bits: u32, offset_bits: u32, addr: u64) -> u64 {
    addr.checked_shr(offset_bits.saturating_add(index_bits)).unwrap_or(0)
}

/// Byte offset within the cache line.
pub fn compute_block_offset(offset_bits: u32, addr: u64) -> u64 {
    addr & low_mask(offset_bits)
}

/// The three fields of a decoded cache address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AddressFields {
    pub tag: u64,
    pub index: u64,
    pub offset: u64,
}

impl AddressFields {
    pub fn decode(index_bits: u32, offset_bits: u32, addr: u64) -> Self {
        AddressFields {
            tag: compute_tag(index_bits, offset_bits, addr),
            index: compute_set_index(index_bits, offset_bits, addr),
            offset: compute_block_offset(offset_bits, addr),
        }
    }

    /// Reassembles the address these fields were decoded from.
    ///
    /// Fields wider than their slot are not masked, so this is only the inverse
    /// of [`AddressFields::decode`] for fields that came out of it.
    pub fn encode(&self, index_bits: u32, offset_bits: u32) -> u64 {
        let tag_shift = offset_bits.saturating_add(index_bits);
        self.tag.checked_shl(tag_shift).unwrap_or(0)
            | self.index.checked_shl(offset_bits).unwrap_or(0)
            | self.offset
    }
}

impl fmt::Display for AddressFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tag:     0x{:08x}", self.tag)?;
        writeln!(f, "Index:   0x{:08x}", self.index)?;
        write!(f, "Offset:  0x{:08x}", self.offset)
    }
}
