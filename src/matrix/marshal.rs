//! Host array <-> native matrix conversion.
//!
//! Both directions validate before allocating:
//! 1. the element type through the registry ([`crate::dtype::DataType::to_native`]),
//! 2. the shape through [`validate_matrix_shape`].
//!
//! `ConversionMode::Copy` transcribes elements in logical row-major order, so sliced,
//! transposed and axis-reversed sources are read correctly. `ConversionMode::ViewAlias`
//! keeps the source's pointer and strides untouched.

use ndarray::{Array3, ArrayD, Axis, Ix3, IxDyn};

use crate::{
    array::HostArray,
    dtype::Depth,
    error::{ConversionError, ConversionPath},
    matrix::{Buffer, ConversionMode, MatData, MatElement, NativeMatrix},
    shape::{MatShape, validate_matrix_shape},
};

/// Convert a host array into a native matrix.
///
/// The returned matrix borrows `host` for `'a`; in `Copy` mode the borrow is only nominal
/// (the matrix owns its buffer and [`NativeMatrix::deep_clone`] can detach it).
///
/// # Errors
/// - [`ConversionError::UnsupportedElementType`] for `bool`, `i64`, `u32`, `u64`
/// - [`ConversionError::UnsupportedRank`] unless the rank is 2 or 3
/// - [`ConversionError::InvalidChannels`] / [`ConversionError::TooManyChannels`] for a
///   trailing dimension outside `1..=MAX_CHANNELS`
pub fn to_native_matrix<'a>(
    host: &'a HostArray,
    mode: ConversionMode,
) -> Result<NativeMatrix<'a>, ConversionError> {
    let dtype = host.data_type();
    let depth = dtype.to_native()?;
    let shape = validate_matrix_shape(host.shape())?;

    tracing::debug!(
        %dtype,
        %depth,
        shape = ?host.shape(),
        strides = ?host.strides(),
        %mode,
        "converting host array to native matrix"
    );

    match depth {
        Depth::U8 => matrix_from_host::<u8>(host, shape, mode),
        Depth::S8 => matrix_from_host::<i8>(host, shape, mode),
        Depth::U16 => matrix_from_host::<u16>(host, shape, mode),
        Depth::S16 => matrix_from_host::<i16>(host, shape, mode),
        Depth::S32 => matrix_from_host::<i32>(host, shape, mode),
        Depth::F32 => matrix_from_host::<f32>(host, shape, mode),
        Depth::F64 => matrix_from_host::<f64>(host, shape, mode),
    }
}

/// Convert a native matrix into a new, independently owned host array.
///
/// The result is rank 2 for matrices built from rank-2 shapes, rank 3 otherwise, and is
/// always contiguous regardless of whether `matrix` owns or aliases its buffer.
pub fn from_native_matrix(matrix: &NativeMatrix<'_>) -> Result<HostArray, ConversionError> {
    let shape = matrix.shape();
    tracing::debug!(
        depth = %matrix.depth(),
        dim = ?shape.dim(),
        dims = shape.dims,
        owner = matrix.is_owner(),
        "converting native matrix to host array"
    );

    with_buffer!(&matrix.data, buffer => host_from_buffer(buffer, shape))
}

// `depth` came from the registry, so `T::TYPE` is the host type of `host`.
fn matrix_from_host<T: MatElement>(
    host: &HostArray,
    shape: MatShape,
    mode: ConversionMode,
) -> Result<NativeMatrix<'_>, ConversionError> {
    let array = T::host_array(host).ok_or(ConversionError::UnsupportedElementType {
        dtype: host.data_type(),
        path: ConversionPath::Matrix,
    })?;
    let mismatch = || ConversionError::ShapeMismatch {
        expected: shape.host_shape().to_vec(),
        actual: array.shape().to_vec(),
    };

    let view = array.view();
    let view = if shape.dims == 2 {
        view.insert_axis(Axis(2))
    } else {
        view
    };
    let view = view.into_dimensionality::<Ix3>().map_err(|_| mismatch())?;

    let buffer = match mode {
        ConversionMode::ViewAlias => Buffer::Alias(view),
        ConversionMode::Copy => {
            let total = shape.total()?;
            let mut data = Vec::with_capacity(total);
            data.extend(view.iter().copied());
            tracing::trace!(
                elements = total,
                bytes = total * T::BYTE_WIDTH,
                "allocated native matrix buffer"
            );
            Buffer::Owned(Array3::from_shape_vec(shape.dim(), data).map_err(|_| mismatch())?)
        }
    };

    Ok(NativeMatrix::from_buffer(buffer, shape.dims))
}

fn host_from_buffer<T: MatElement>(
    buffer: &Buffer<'_, T>,
    shape: MatShape,
) -> Result<HostArray, ConversionError> {
    let view = buffer.view();
    let actual = vec![view.len()];
    let data: Vec<T> = view.iter().copied().collect();

    let host_shape = shape.host_shape();
    let array = ArrayD::from_shape_vec(IxDyn(&host_shape), data).map_err(|_| {
        ConversionError::ShapeMismatch {
            expected: host_shape.to_vec(),
            actual,
        }
    })?;
    Ok(T::into_host(array))
}
