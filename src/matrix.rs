use crate::address::{MATRIX_ELEMENT_BYTES, compute_matrix_index};
use crate::error::{DecodeError, Result};

/// A matrix of 4-byte elements laid out from `base`, wrapping to a new row
/// every `num_rows` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixLayout {
    num_rows: u64,
    base: u64,
}

impl MatrixLayout {
    pub fn new(num_rows: u64, base: u64) -> Result<Self> {
        if num_rows == 0 {
            return Err(DecodeError::ZeroRows);
        }
        Ok(MatrixLayout { num_rows, base })
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Coordinate of the element stored at `addr`.
    pub fn locate(&self, addr: u64) -> Result<(u64, u64)> {
        let distance = addr.checked_sub(self.base).ok_or(DecodeError::BelowBase {
            addr,
            base: self.base,
        })?;
        if distance % MATRIX_ELEMENT_BYTES != 0 {
            return Err(DecodeError::Misaligned { distance });
        }
        Ok(compute_matrix_index(self.num_rows, addr, self.base))
    }

    /// Byte address of element `(row, col)`. Wraps on overflow.
    pub fn address_of(&self, row: u64, col: u64) -> u64 {
        let element = row.wrapping_mul(self.num_rows).wrapping_add(col);
        self.base.wrapping_add(element.wrapping_mul(MATRIX_ELEMENT_BYTES))
    }
}
