//! Shape validation.
//!
//! Decides whether a host array's rank and extents can become a native matrix, and whether
//! a nested sequence's depth can become a native vector. Nothing here allocates a buffer.

use smallvec::{SmallVec, smallvec};

use crate::{
    consts,
    error::{ConversionError, ConversionPath},
};

/// Native matrix shape derived from a host array shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MatShape {
    pub rows: usize,
    pub cols: usize,
    pub channels: usize,
    /// Rank of the host array the shape describes (2 or 3).
    pub dims: usize,
}

impl MatShape {
    pub const fn new_2d(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            channels: 1,
            dims: 2,
        }
    }

    /// A rank-3 shape whose trailing dimension is the channel count.
    pub const fn new_3d(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels,
            dims: 3,
        }
    }

    pub const fn dim(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.channels)
    }

    /// The host-side shape this matrix converts back into.
    pub fn host_shape(&self) -> SmallVec<[usize; 4]> {
        if self.dims == 2 {
            smallvec![self.rows, self.cols]
        } else {
            smallvec![self.rows, self.cols, self.channels]
        }
    }

    /// Number of scalar elements, `rows * cols * channels`.
    pub fn total(&self) -> Result<usize, ConversionError> {
        num_elements(&[self.rows, self.cols, self.channels])
    }
}

pub fn num_elements(shape: &[usize]) -> Result<usize, ConversionError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(ConversionError::ShapeOverflow)
}

/// Decide whether `shape` is matrix-eligible.
///
/// - rank 2 is `rows x cols`, single channel
/// - rank 3 is `rows x cols x channels`
///
/// # Errors
/// - [`ConversionError::UnsupportedRank`] for rank 0, 1 or above 3
/// - [`ConversionError::InvalidChannels`] for an empty trailing dimension
/// - [`ConversionError::TooManyChannels`] above [`consts::MAX_CHANNELS`]
/// - [`ConversionError::ShapeOverflow`] when the element count overflows `usize`
pub fn validate_matrix_shape(shape: &[usize]) -> Result<MatShape, ConversionError> {
    if !consts::MATRIX_RANKS.contains(&shape.len()) {
        return Err(ConversionError::UnsupportedRank {
            rank: shape.len(),
            path: ConversionPath::Matrix,
        });
    }

    let mat_shape = match *shape {
        [rows, cols] => MatShape::new_2d(rows, cols),
        [rows, cols, channels] => {
            if channels == 0 {
                return Err(ConversionError::InvalidChannels);
            }
            if channels > consts::MAX_CHANNELS {
                return Err(ConversionError::TooManyChannels {
                    channels,
                    max: consts::MAX_CHANNELS,
                });
            }
            MatShape::new_3d(rows, cols, channels)
        }
        _ => {
            return Err(ConversionError::UnsupportedRank {
                rank: shape.len(),
                path: ConversionPath::Matrix,
            });
        }
    };

    mat_shape.total()?;
    Ok(mat_shape)
}

/// Decide whether a nesting depth is vector-eligible (1..=3).
pub fn validate_vector_depth(depth: usize) -> Result<(), ConversionError> {
    if depth == 0 || depth > consts::MAX_VECTOR_DEPTH {
        return Err(ConversionError::UnsupportedRank {
            rank: depth,
            path: ConversionPath::Vector,
        });
    }
    Ok(())
}
