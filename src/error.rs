use thiserror::Error;

use crate::{
    dtype::DataType,
    vector::{ElementKind, LeafType},
};

/// Which conversion path rejected an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPath {
    Matrix,
    Vector,
}

impl std::fmt::Display for ConversionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matrix => write!(f, "matrix"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

/// Errors returned by the matrix and vector marshalers.
///
/// Every variant is raised before any native buffer is allocated, except
/// [`ConversionError::ShapeMismatch`], which signals an internal inconsistency that
/// validation should have ruled out.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
pub enum ConversionError {
    /// The host element type has no lossless native counterpart on this path.
    #[error("element type {dtype} is not supported on the {path} path")]
    UnsupportedElementType {
        dtype: DataType,
        path: ConversionPath,
    },
    /// A buffer-protocol format string that does not name a supported element type.
    #[error("unsupported buffer format {format:?}")]
    UnsupportedFormat { format: String },
    /// Rank (or nesting depth) outside the 2..=3 matrix / 1..=3 vector envelope.
    #[error("rank {rank} is not supported on the {path} path")]
    UnsupportedRank { rank: usize, path: ConversionPath },
    /// The trailing dimension of a rank-3 array exceeds the native channel limit.
    #[error("{channels} channels exceed the native limit of {max}")]
    TooManyChannels { channels: usize, max: usize },
    #[error("a rank-3 array must have at least one channel")]
    InvalidChannels,
    #[error("shape element count overflow")]
    ShapeOverflow,
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// Leaves of a nested sequence do not share one element type.
    #[error("inconsistent leaf types: {first} mixed with {conflicting}")]
    InconsistentElementType {
        first: LeafType,
        conflicting: LeafType,
    },
    /// The leaves of a nested sequence are not of the requested kind.
    #[error("requested {requested} leaves, found {found}")]
    ElementKindMismatch {
        requested: ElementKind,
        found: ElementKind,
    },
    /// Leaves (or sub-sequences) of a nested sequence sit at different depths.
    #[error("non-uniform nesting: leaves at depth {expected}, found an element at depth {found}")]
    NonUniformDepth { expected: usize, found: usize },
    #[error("wrong byte length: expected {expected}, got {actual}")]
    WrongByteLen { expected: usize, actual: usize },
}
