use crate::error::{DecodeError, Result};

/// Mask with the `bits` lowest bits set. Saturates at a full 64-bit mask.
pub fn low_mask(bits: u32) -> u64 {
    match 1u64.checked_shl(bits) {
        Some(bit) => bit - 1,
        None => u64::MAX,
    }
}

/// `Some(k)` when `value == 2^k`.
pub fn exact_log2(value: u64) -> Option<u32> {
    value
        .is_power_of_two()
        .then(|| value.trailing_zeros())
}

/// Number of lines per set. Zero ways means fully associative.
pub fn calculate_num_ways(ways: u64, lines: u64) -> Result<u64> {
    match ways {
        0 => Ok(lines),
        w if w > lines => Err(DecodeError::TooManyWays { ways: w, lines }),
        w => Ok(w),
    }
}

pub fn calculate_num_sets(lines: u64, num_ways: u64) -> Result<u64> {
    if num_ways == 0 {
        return Err(DecodeError::ZeroWays);
    }
    if lines % num_ways != 0 {
        return Err(DecodeError::UnevenWays {
            ways: num_ways,
            lines,
        });
    }
    Ok(lines / num_ways)
}
