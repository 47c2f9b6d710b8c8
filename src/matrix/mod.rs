//! Native 2-D/3-D matrices.
//!
//! A [`NativeMatrix`] stores `rows x cols x channels` elements of a single native
//! [`Depth`]. Storage is a closed sum type ([`MatData`]) with one variant per depth; each
//! variant holds a [`Buffer`], which is either:
//! - [`Buffer::Owned`]: a contiguous, row-major `ndarray::Array3` the matrix owns, or
//! - [`Buffer::Alias`]: an `ndarray::ArrayView3` over a host array's memory, carrying that
//!   array's pointer and strides. The matrix does not own it.
//!
//! ## Lifetimes
//! `NativeMatrix<'a>` is bound to the host array it may alias. Owned matrices (from
//! `ConversionMode::Copy`, [`NativeMatrix::deep_clone`] or [`NativeMatrix::from_bytes`]) are
//! `NativeMatrix<'static>`. An aliasing matrix cannot outlive its host array, and the host
//! array cannot be mutated while the alias exists.
//!
//! ## Rank convention
//! Storage is always 3-axis. A matrix built from a rank-2 host array has `dims() == 2` and
//! one channel; converting it back yields a rank-2 array. A rank-3 host array keeps rank 3,
//! including the `rows x cols x 1` case.
//!
//! ## Raw buffers
//! [`NativeMatrix::to_bytes`] exports the elements as one packed, native-endian, row-major
//! buffer; [`NativeMatrix::from_bytes`] validates and decodes such a buffer.

use bytes::Bytes;
use ndarray::{Array3, ArrayView3};
use smallvec::SmallVec;

use crate::{
    dtype::Depth,
    error::ConversionError,
    shape::{MatShape, validate_matrix_shape},
};

/// Evaluate `$body` with `$buffer` bound to the typed [`Buffer`] inside a [`MatData`].
macro_rules! with_buffer {
    ($data:expr, $buffer:ident => $body:expr) => {
        match $data {
            MatData::U8($buffer) => $body,
            MatData::S8($buffer) => $body,
            MatData::U16($buffer) => $body,
            MatData::S16($buffer) => $body,
            MatData::S32($buffer) => $body,
            MatData::F32($buffer) => $body,
            MatData::F64($buffer) => $body,
        }
    };
}

pub mod element;
pub mod marshal;

pub use element::MatElement;
pub use marshal::{from_native_matrix, to_native_matrix};

/// How [`to_native_matrix`] obtains the native buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Allocate an owning, contiguous buffer and copy every element.
    Copy,
    /// Borrow the host array's memory; no copy, no ownership.
    ViewAlias,
}

impl std::fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::ViewAlias => write!(f, "view_alias"),
        }
    }
}

/// Typed matrix storage, owned or aliased.
#[derive(Debug, Clone)]
pub enum Buffer<'a, T> {
    Owned(Array3<T>),
    Alias(ArrayView3<'a, T>),
}

impl<'a, T: MatElement> Buffer<'a, T> {
    pub fn view(&self) -> ArrayView3<'_, T> {
        match self {
            Self::Owned(array) => array.view(),
            Self::Alias(view) => view.view(),
        }
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            Self::Owned(array) => array.dim(),
            Self::Alias(view) => view.dim(),
        }
    }

    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Copy into a new contiguous, row-major, owned buffer.
    pub fn to_owned_buffer(&self) -> Buffer<'static, T> {
        Buffer::Owned(self.view().as_standard_layout().into_owned())
    }

    /// Overwrite `dst` in place when it already owns a buffer of this type and extent.
    ///
    /// Returns `false` (leaving `dst` untouched) when a new allocation is required.
    fn assign_into(&self, dst: &mut MatData<'static>) -> bool {
        match T::buffer_mut(dst) {
            Some(Buffer::Owned(target)) if target.dim() == self.dim() => {
                target.assign(&self.view());
                true
            }
            _ => false,
        }
    }

    fn encode(&self) -> Vec<u8> {
        let view = self.view();
        let mut out = Vec::with_capacity(view.len() * T::BYTE_WIDTH);
        for &value in view.iter() {
            value.put_ne(&mut out);
        }
        out
    }
}

/// Matrix storage, one variant per native depth.
#[derive(Debug, Clone)]
pub enum MatData<'a> {
    U8(Buffer<'a, u8>),
    S8(Buffer<'a, i8>),
    U16(Buffer<'a, u16>),
    S16(Buffer<'a, i16>),
    S32(Buffer<'a, i32>),
    F32(Buffer<'a, f32>),
    F64(Buffer<'a, f64>),
}

impl MatData<'_> {
    pub const fn depth(&self) -> Depth {
        match self {
            Self::U8(_) => Depth::U8,
            Self::S8(_) => Depth::S8,
            Self::U16(_) => Depth::U16,
            Self::S16(_) => Depth::S16,
            Self::S32(_) => Depth::S32,
            Self::F32(_) => Depth::F32,
            Self::F64(_) => Depth::F64,
        }
    }
}

/// A native `rows x cols x channels` matrix of one element depth.
#[derive(Debug, Clone)]
pub struct NativeMatrix<'a> {
    data: MatData<'a>,
    dims: usize,
}

impl<'a> NativeMatrix<'a> {
    pub(crate) fn from_buffer<T: MatElement>(buffer: Buffer<'a, T>, dims: usize) -> Self {
        Self {
            data: T::wrap(buffer),
            dims,
        }
    }

    pub const fn depth(&self) -> Depth {
        self.data.depth()
    }

    pub fn rows(&self) -> usize {
        self.dim().0
    }

    pub fn cols(&self) -> usize {
        self.dim().1
    }

    pub fn channels(&self) -> usize {
        self.dim().2
    }

    /// Rank of the host array this matrix maps to (2 or 3).
    pub const fn dims(&self) -> usize {
        self.dims
    }

    /// Storage extents `(rows, cols, channels)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        with_buffer!(&self.data, buffer => buffer.dim())
    }

    pub fn shape(&self) -> MatShape {
        let (rows, cols, channels) = self.dim();
        MatShape {
            rows,
            cols,
            channels,
            dims: self.dims,
        }
    }

    pub fn total(&self) -> usize {
        let (rows, cols, channels) = self.dim();
        rows * cols * channels
    }

    pub fn type_code(&self) -> usize {
        self.depth().type_code(self.channels())
    }

    /// `false` when the matrix aliases host memory.
    pub fn is_owner(&self) -> bool {
        with_buffer!(&self.data, buffer => buffer.is_owned())
    }

    pub fn is_continuous(&self) -> bool {
        with_buffer!(&self.data, buffer => buffer.view().is_standard_layout())
    }

    /// Per-axis strides, in elements.
    pub fn strides(&self) -> SmallVec<[isize; 4]> {
        with_buffer!(&self.data, buffer => buffer.view().strides().iter().copied().collect())
    }

    pub fn as_ptr(&self) -> *const u8 {
        with_buffer!(&self.data, buffer => buffer.view().as_ptr() as *const u8)
    }

    pub fn view<T: MatElement>(&self) -> Option<ArrayView3<'_, T>> {
        T::buffer(&self.data).map(Buffer::view)
    }

    pub fn get<T: MatElement>(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        T::buffer(&self.data)?.view().get((row, col, channel)).copied()
    }

    pub fn deep_clone(&self) -> NativeMatrix<'static> {
        with_buffer!(&self.data, buffer => {
            NativeMatrix::from_buffer(buffer.to_owned_buffer(), self.dims)
        })
    }

    /// Copy into `dst`, reusing its buffer when it already owns one of the same depth and
    /// extent, and reallocating it otherwise.
    pub fn copy_to(&self, dst: &mut NativeMatrix<'static>) {
        let reused = with_buffer!(&self.data, buffer => buffer.assign_into(&mut dst.data));
        if reused {
            dst.dims = self.dims;
        } else {
            *dst = self.deep_clone();
        }
        tracing::trace!(reused, depth = %self.depth(), dim = ?self.dim(), "copied native matrix");
    }

    /// Export the elements as one packed, native-endian, row-major buffer.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(with_buffer!(&self.data, buffer => buffer.encode()))
    }
}

impl Default for NativeMatrix<'static> {
    /// An empty, owning `0 x 0` matrix of depth `U8`.
    fn default() -> Self {
        NativeMatrix::from_buffer(Buffer::Owned(Array3::<u8>::zeros((0, 0, 1))), 2)
    }
}

impl NativeMatrix<'static> {
    /// Decode a packed, native-endian, row-major buffer.
    ///
    /// # Errors
    /// - shape errors from [`validate_matrix_shape`]
    /// - [`ConversionError::ShapeMismatch`] when `shape` is inconsistent with its own rank
    ///   (e.g. a rank-2 shape with several channels)
    /// - [`ConversionError::WrongByteLen`] when `bytes` does not hold exactly
    ///   `rows * cols * channels` elements of `depth`
    pub fn from_bytes(
        depth: Depth,
        shape: MatShape,
        bytes: Bytes,
    ) -> Result<Self, ConversionError> {
        let checked = validate_matrix_shape(&shape.host_shape())?;
        if checked != shape {
            return Err(ConversionError::ShapeMismatch {
                expected: vec![shape.rows, shape.cols, shape.channels],
                actual: vec![checked.rows, checked.cols, checked.channels],
            });
        }

        let expected = shape
            .total()?
            .checked_mul(depth.item_size())
            .ok_or(ConversionError::ShapeOverflow)?;
        if bytes.len() != expected {
            return Err(ConversionError::WrongByteLen {
                expected,
                actual: bytes.len(),
            });
        }

        match depth {
            Depth::U8 => decode::<u8>(&bytes, shape),
            Depth::S8 => decode::<i8>(&bytes, shape),
            Depth::U16 => decode::<u16>(&bytes, shape),
            Depth::S16 => decode::<i16>(&bytes, shape),
            Depth::S32 => decode::<i32>(&bytes, shape),
            Depth::F32 => decode::<f32>(&bytes, shape),
            Depth::F64 => decode::<f64>(&bytes, shape),
        }
    }
}

fn decode<T: MatElement>(
    bytes: &[u8],
    shape: MatShape,
) -> Result<NativeMatrix<'static>, ConversionError> {
    let data: Vec<T> = bytes
        .chunks_exact(T::BYTE_WIDTH)
        .map(T::from_ne_chunk)
        .collect();
    let actual = vec![data.len()];
    let array =
        Array3::from_shape_vec(shape.dim(), data).map_err(|_| ConversionError::ShapeMismatch {
            expected: vec![shape.rows, shape.cols, shape.channels],
            actual,
        })?;
    Ok(NativeMatrix::from_buffer(Buffer::Owned(array), shape.dims))
}
