//! Host-side arrays.
//!
//! [`HostArray`] is a closed sum type over `ndarray::ArrayD<T>` for every host
//! [`DataType`]. Any rank and any stride pattern is representable (sliced, transposed or
//! axis-reversed arrays keep their original buffer and carry non-contiguous strides).
//!
//! Equality is logical: two arrays are equal when their element types, shapes and elements
//! match, regardless of memory layout.

use ndarray::{ArrayD, IxDyn};

use crate::{dtype::DataType, error::ConversionError};

#[derive(Debug, Clone, PartialEq)]
pub enum HostArray {
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Bool(ArrayD<bool>),
}

/// Element types a [`HostArray`] can hold.
pub trait HostElement: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const TYPE: DataType;

    fn into_host(array: ArrayD<Self>) -> HostArray;

    /// Borrow the typed array if `host` holds this element type.
    fn host_array(host: &HostArray) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_host_element {
    ($ty:ty, $variant:ident) => {
        impl HostElement for $ty {
            const TYPE: DataType = DataType::$variant;

            fn into_host(array: ArrayD<Self>) -> HostArray {
                HostArray::$variant(array)
            }

            fn host_array(host: &HostArray) -> Option<&ArrayD<Self>> {
                match host {
                    HostArray::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }

        impl From<ArrayD<$ty>> for HostArray {
            fn from(array: ArrayD<$ty>) -> Self {
                HostArray::$variant(array)
            }
        }
    };
}

impl_host_element!(i8, I8);
impl_host_element!(i16, I16);
impl_host_element!(i32, I32);
impl_host_element!(i64, I64);
impl_host_element!(u8, U8);
impl_host_element!(u16, U16);
impl_host_element!(u32, U32);
impl_host_element!(u64, U64);
impl_host_element!(f32, F32);
impl_host_element!(f64, F64);
impl_host_element!(bool, Bool);

/// Evaluate `$body` with `$array` bound to the typed array inside a [`HostArray`].
macro_rules! with_host_array {
    ($host:expr, $array:ident => $body:expr) => {
        match $host {
            HostArray::I8($array) => $body,
            HostArray::I16($array) => $body,
            HostArray::I32($array) => $body,
            HostArray::I64($array) => $body,
            HostArray::U8($array) => $body,
            HostArray::U16($array) => $body,
            HostArray::U32($array) => $body,
            HostArray::U64($array) => $body,
            HostArray::F32($array) => $body,
            HostArray::F64($array) => $body,
            HostArray::Bool($array) => $body,
        }
    };
}

impl HostArray {
    /// Build an array from row-major elements and a shape.
    ///
    /// # Errors
    /// [`ConversionError::ShapeMismatch`] when `data.len()` does not match `shape`.
    pub fn from_shape_vec<T: HostElement>(
        shape: &[usize],
        data: Vec<T>,
    ) -> Result<Self, ConversionError> {
        let actual = vec![data.len()];
        let array = ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| {
            ConversionError::ShapeMismatch {
                expected: shape.to_vec(),
                actual,
            }
        })?;
        Ok(T::into_host(array))
    }

    pub const fn data_type(&self) -> DataType {
        match self {
            Self::I8(_) => DataType::I8,
            Self::I16(_) => DataType::I16,
            Self::I32(_) => DataType::I32,
            Self::I64(_) => DataType::I64,
            Self::U8(_) => DataType::U8,
            Self::U16(_) => DataType::U16,
            Self::U32(_) => DataType::U32,
            Self::U64(_) => DataType::U64,
            Self::F32(_) => DataType::F32,
            Self::F64(_) => DataType::F64,
            Self::Bool(_) => DataType::Bool,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_host_array!(self, array => array.shape())
    }

    /// Per-dimension strides, in elements. May be negative.
    pub fn strides(&self) -> &[isize] {
        with_host_array!(self, array => array.strides())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        with_host_array!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_standard_layout(&self) -> bool {
        with_host_array!(self, array => array.is_standard_layout())
    }

    /// Address of the element at the logical origin.
    pub fn as_ptr(&self) -> *const u8 {
        with_host_array!(self, array => array.as_ptr() as *const u8)
    }

    pub fn typed<T: HostElement>(&self) -> Option<&ArrayD<T>> {
        T::host_array(self)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Axis, s};

    use super::*;

    #[test]
    fn reports_metadata() {
        let host = HostArray::from(ndarray::array![[1i16, 2, 3], [4, 5, 6]].into_dyn());
        assert_eq!(host.data_type(), DataType::I16);
        assert_eq!(host.shape(), &[2, 3]);
        assert_eq!(host.strides(), &[3, 1]);
        assert_eq!(host.ndim(), 2);
        assert_eq!(host.len(), 6);
        assert!(host.is_standard_layout());
        assert!(host.typed::<i16>().is_some());
        assert!(host.typed::<u16>().is_none());
    }

    #[test]
    fn from_shape_vec_checks_element_count() {
        let host = HostArray::from_shape_vec(&[2, 2], vec![1.5f64, 2.5, 3.5, 4.5]).unwrap();
        assert_eq!(host.data_type(), DataType::F64);

        let err = match HostArray::from_shape_vec(&[2, 2], vec![1u8, 2, 3]) {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        match err {
            ConversionError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, vec![2, 2]);
                assert_eq!(actual, vec![3]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn equality_ignores_memory_layout() {
        let base = ndarray::array![[1i32, 2, 3], [4, 5, 6]];
        let transposed = base.clone().reversed_axes();
        assert!(!transposed.is_standard_layout());

        let logical = ndarray::array![[1i32, 4], [2, 5], [3, 6]];
        assert_eq!(HostArray::from(transposed.into_dyn()), HostArray::from(logical.into_dyn()));
    }

    #[test]
    fn strided_arrays_keep_their_strides() {
        let base = ndarray::Array2::from_shape_vec((3, 4), (0u8..12).collect()).unwrap();
        let every_other = base.slice_move(s![.., ..;2]);
        let host = HostArray::from(every_other.into_dyn());
        assert_eq!(host.shape(), &[3, 2]);
        assert_eq!(host.strides(), &[4, 2]);
        assert!(!host.is_standard_layout());

        let mut reversed = ndarray::array![[1u8, 2], [3, 4]];
        reversed.invert_axis(Axis(0));
        let host = HostArray::from(reversed.into_dyn());
        assert_eq!(host.strides(), &[-2, 1]);
    }

    #[test]
    fn distinct_types_are_never_equal() {
        let a = HostArray::from(ndarray::array![[1i8]].into_dyn());
        let b = HostArray::from(ndarray::array![[1u8]].into_dyn());
        assert_ne!(a, b);
    }
}
