pub use crate::address::{
    AddressFields, compute_block_offset, compute_matrix_index, compute_set_index, compute_tag,
};
pub use crate::error::{DecodeError, Result};
pub use crate::geometry::CacheGeometry;
pub use crate::matrix::MatrixLayout;

/// Raw address decoding: matrix coordinates and `[ tag | index | offset ]` fields
pub mod address;
pub mod error;
/// Cache shape configuration (s, E, b)
pub mod geometry;
/// Checked matrix indexing
pub mod matrix;
/// CSV output of decoded addresses
pub mod report;
pub mod utils;
