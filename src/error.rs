use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Rejections raised by the validated entry points ([`crate::matrix::MatrixLayout`]
/// and [`crate::geometry::CacheGeometry`]). The raw functions in
/// [`crate::address`] never produce these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("matrix must have at least one row")]
    ZeroRows,

    #[error("address {addr:#x} lies below matrix base {base:#x}")]
    BelowBase { addr: u64, base: u64 },

    #[error("distance {distance} from matrix base is not a multiple of the element size")]
    Misaligned { distance: u64 },

    #[error("a cache set needs at least one way")]
    ZeroWays,

    #[error("{index_bits} index bits plus {offset_bits} offset bits exceed a 64-bit address")]
    FieldsTooWide { index_bits: u32, offset_bits: u32 },

    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo { what: &'static str, value: u64 },

    #[error("the number of ways ({ways}) exceeds the number of lines in the cache ({lines})")]
    TooManyWays { ways: u64, lines: u64 },

    #[error("{lines} lines cannot be split evenly into sets of {ways} ways")]
    UnevenWays { ways: u64, lines: u64 },

    #[error("a {cache_bytes}-byte cache cannot hold a single {block_bytes}-byte block")]
    CacheTooSmall { cache_bytes: u64, block_bytes: u64 },
}
