use serde::{Deserialize, Serialize};

use crate::address::{self, AddressFields};
use crate::error::{DecodeError, Result};
use crate::utils::{calculate_num_sets, calculate_num_ways, exact_log2, low_mask};

/// Shape of a set-associative cache: `2^index_bits` sets of `ways` lines, each
/// line `2^offset_bits` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct CacheGeometry {
    index_bits: u32,
    ways: u64,
    offset_bits: u32,
}

/// Unchecked form used for deserialization.
#[derive(Deserialize)]
struct RawGeometry {
    index_bits: u32,
    ways: u64,
    offset_bits: u32,
}

impl TryFrom<RawGeometry> for CacheGeometry {
    type Error = DecodeError;

    fn try_from(raw: RawGeometry) -> Result<Self> {
        CacheGeometry::new(raw.index_bits, raw.ways, raw.offset_bits)
    }
}

impl CacheGeometry {
    pub fn new(index_bits: u32, ways: u64, offset_bits: u32) -> Result<Self> {
        if ways == 0 {
            return Err(DecodeError::ZeroWays);
        }
        if index_bits.saturating_add(offset_bits) > u64::BITS {
            return Err(DecodeError::FieldsTooWide {
                index_bits,
                offset_bits,
            });
        }
        log::debug!(
            "cache geometry: s={} E={} b={} ({} sets)",
            index_bits,
            ways,
            offset_bits,
            1u128 << index_bits
        );
        Ok(CacheGeometry {
            index_bits,
            ways,
            offset_bits,
        })
    }

    /// Derives the bit widths from byte sizes. `ways == 0` requests a fully
    /// associative cache.
    pub fn from_capacity(cache_bytes: u64, block_bytes: u64, ways: u64) -> Result<Self> {
        let offset_bits = exact_log2(block_bytes).ok_or(DecodeError::NotPowerOfTwo {
            what: "block size",
            value: block_bytes,
        })?;
        let lines = cache_bytes / block_bytes;
        if lines == 0 {
            return Err(DecodeError::CacheTooSmall {
                cache_bytes,
                block_bytes,
            });
        }
        if cache_bytes % block_bytes != 0 {
            log::warn!(
                "cache size {} is not a whole number of {}-byte blocks, using {} lines",
                cache_bytes,
                block_bytes,
                lines
            );
        }

        let num_ways = calculate_num_ways(ways, lines)?;
        let num_sets = calculate_num_sets(lines, num_ways)?;
        let index_bits = exact_log2(num_sets).ok_or(DecodeError::NotPowerOfTwo {
            what: "set count",
            value: num_sets,
        })?;

        CacheGeometry::new(index_bits, num_ways, offset_bits)
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn ways(&self) -> u64 {
        self.ways
    }

    pub fn tag_bits(&self) -> u32 {
        u64::BITS - self.index_bits - self.offset_bits
    }

    /// Saturates at `u64::MAX` for a 64-bit index field.
    pub fn num_sets(&self) -> u64 {
        1u64.checked_shl(self.index_bits).unwrap_or(u64::MAX)
    }

    /// Saturates at `u64::MAX` for a 64-bit offset field.
    pub fn block_bytes(&self) -> u64 {
        1u64.checked_shl(self.offset_bits).unwrap_or(u64::MAX)
    }

    pub fn total_lines(&self) -> u64 {
        self.num_sets().saturating_mul(self.ways)
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.total_lines().saturating_mul(self.block_bytes())
    }

    pub fn set_mask(&self) -> u64 {
        low_mask(self.index_bits)
    }

    pub fn set_index(&self, addr: u64) -> u64 {
        address::compute_set_index(self.index_bits, self.offset_bits, addr)
    }

    pub fn tag(&self, addr: u64) -> u64 {
        address::compute_tag(self.index_bits, self.offset_bits, addr)
    }

    pub fn block_offset(&self, addr: u64) -> u64 {
        address::compute_block_offset(self.offset_bits, addr)
    }

    pub fn fields(&self, addr: u64) -> AddressFields {
        AddressFields::decode(self.index_bits, self.offset_bits, addr)
    }

    /// Position of the first line of `addr`'s set in a flat, set-major array
    /// of lines.
    pub fn first_line(&self, addr: u64) -> u64 {
        self.set_index(addr).saturating_mul(self.ways)
    }

    /// Whether two addresses fall in the same cache line.
    pub fn same_block(&self, a: u64, b: u64) -> bool {
        let line = |addr: u64| addr.checked_shr(self.offset_bits).unwrap_or(0);
        line(a) == line(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_parameters() {
        let g = CacheGeometry::new(4, 2, 5).unwrap();
        assert_eq!(g.num_sets(), 16);
        assert_eq!(g.block_bytes(), 32);
        assert_eq!(g.total_lines(), 32);
        assert_eq!(g.capacity_bytes(), 1024);
        assert_eq!(g.set_mask(), 0xF);
        assert_eq!(g.tag_bits(), 55);

        assert_eq!(g.set_index(2668), 3);
        assert_eq!(g.tag(2668), 5);
        assert_eq!(g.block_offset(2668), 12);
        assert_eq!(g.first_line(2668), 6);
        assert_eq!(
            g.fields(2668),
            AddressFields {
                tag: 5,
                index: 3,
                offset: 12
            }
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        assert_eq!(CacheGeometry::new(4, 0, 5), Err(DecodeError::ZeroWays));
        assert_eq!(
            CacheGeometry::new(40, 1, 25),
            Err(DecodeError::FieldsTooWide {
                index_bits: 40,
                offset_bits: 25
            })
        );
        assert!(CacheGeometry::new(40, 1, 24).is_ok());
    }

    #[test]
    fn full_width_geometry() {
        let g = CacheGeometry::new(64, 1, 0).unwrap();
        assert_eq!(g.tag_bits(), 0);
        assert_eq!(g.num_sets(), u64::MAX);
        assert_eq!(g.set_index(u64::MAX), u64::MAX);
        assert_eq!(g.tag(u64::MAX), 0);
    }

    #[test]
    fn from_capacity_set_associative() {
        // 32 KiB, 64-byte lines, 8-way: 512 lines, 64 sets
        let g = CacheGeometry::from_capacity(32 * 1024, 64, 8).unwrap();
        assert_eq!(g.offset_bits(), 6);
        assert_eq!(g.index_bits(), 6);
        assert_eq!(g.ways(), 8);
        assert_eq!(g.capacity_bytes(), 32 * 1024);
    }

    #[test]
    fn from_capacity_fully_associative() {
        let g = CacheGeometry::from_capacity(1024, 16, 0).unwrap();
        assert_eq!(g.index_bits(), 0);
        assert_eq!(g.ways(), 64);
        assert_eq!(g.set_index(0xffff_ffff), 0);
    }

    #[test]
    fn from_capacity_errors() {
        assert_eq!(
            CacheGeometry::from_capacity(1024, 24, 1),
            Err(DecodeError::NotPowerOfTwo {
                what: "block size",
                value: 24
            })
        );
        assert_eq!(
            CacheGeometry::from_capacity(1024, 16, 128),
            Err(DecodeError::TooManyWays {
                ways: 128,
                lines: 64
            })
        );
        assert_eq!(
            CacheGeometry::from_capacity(1536, 16, 32),
            Err(DecodeError::NotPowerOfTwo {
                what: "set count",
                value: 3
            })
        );
        assert_eq!(
            CacheGeometry::from_capacity(8, 16, 1),
            Err(DecodeError::CacheTooSmall {
                cache_bytes: 8,
                block_bytes: 16
            })
        );
    }

    #[test]
    fn from_capacity_rejects_ways_that_do_not_divide_lines() {
        // 64 lines in sets of 48 would leave a 768-byte cache
        assert_eq!(
            CacheGeometry::from_capacity(1024, 16, 48),
            Err(DecodeError::UnevenWays {
                ways: 48,
                lines: 64
            })
        );
        // 70 lines in sets of 32 would leave a 1024-byte cache
        assert_eq!(
            CacheGeometry::from_capacity(1120, 16, 32),
            Err(DecodeError::UnevenWays {
                ways: 32,
                lines: 70
            })
        );
        assert_eq!(
            CacheGeometry::from_capacity(1024, 16, 3),
            Err(DecodeError::UnevenWays { ways: 3, lines: 64 })
        );
    }

    #[test]
    fn from_capacity_drops_partial_block() {
        let g = CacheGeometry::from_capacity(1030, 16, 0).unwrap();
        assert_eq!(g.ways(), 64);
        assert_eq!(g.index_bits(), 0);
        assert_eq!(g.capacity_bytes(), 1024);
    }

    #[test]
    fn same_block() {
        let g = CacheGeometry::new(4, 1, 5).unwrap();
        assert!(g.same_block(0x40, 0x5f));
        assert!(!g.same_block(0x40, 0x60));
    }

    #[test]
    fn deserializes_through_validation() {
        let mut rdr = csv::Reader::from_reader("index_bits,ways,offset_bits\n4,2,5\n".as_bytes());
        let g: CacheGeometry = rdr.deserialize().next().unwrap().unwrap();
        assert_eq!(g, CacheGeometry::new(4, 2, 5).unwrap());

        let mut rdr = csv::Reader::from_reader("index_bits,ways,offset_bits\n4,0,5\n".as_bytes());
        let bad: std::result::Result<CacheGeometry, csv::Error> = rdr.deserialize().next().unwrap();
        assert!(bad.is_err());
    }
}
