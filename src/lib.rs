//! Marshaling between host arrays and native matrices.
//!
//! `matbridge` converts between two data models:
//! - [`HostArray`]: a dynamically-typed, strided, n-dimensional array (backed by `ndarray`).
//! - [`NativeMatrix`]: a fixed-format 2-D/3-D element-typed matrix (`rows x cols x channels`).
//!
//! and between a host nested sequence ([`HostValue`]) and a native nested vector
//! ([`NativeVector`]) of booleans or numbers, up to three levels deep.
//!
//! ## Conversion modes
//! Matrices can be built in two [`ConversionMode`]s:
//! - `Copy` allocates a contiguous, owning buffer and transcribes every element.
//! - `ViewAlias` borrows the host array's memory (pointer + strides) without copying.
//!   The borrow is tracked by the `'a` lifetime of [`NativeMatrix<'a>`], so an alias can
//!   never outlive the host array it points into.
//!
//! Converting back ([`from_native_matrix`], [`from_native_vector`]) always copies.
//!
//! ## Example
//! ```rust
//! use matbridge::{ConversionMode, HostArray, from_native_matrix, to_native_matrix};
//!
//! let host = HostArray::from(ndarray::array![[1i8, -2, 3], [-4, 5, -6]].into_dyn());
//! let mat = to_native_matrix(&host, ConversionMode::ViewAlias).unwrap();
//! assert!(!mat.is_owner());
//! assert_eq!((mat.rows(), mat.cols(), mat.channels()), (2, 3, 1));
//!
//! let back = from_native_matrix(&mat).unwrap();
//! assert_eq!(back, host);
//! ```

pub mod array;
pub mod consts;
pub mod dtype;
pub mod error;
pub mod harness;
pub mod matrix;
pub mod shape;
pub mod vector;

pub use array::{HostArray, HostElement};
pub use dtype::{DataType, Depth};
pub use error::{ConversionError, ConversionPath};
pub use matrix::{
    Buffer, ConversionMode, MatElement, NativeMatrix, from_native_matrix, to_native_matrix,
};
pub use shape::MatShape;
pub use vector::{
    ElementKind, HostValue, LeafType, NativeVector, VectorAttributes, VectorNode,
    from_native_vector, inspect, to_native_vector,
};

// Conversions share no state, so every public type must be usable across threads.
#[allow(dead_code)]
const _: () = {
    fn assert<T: Send + Sync>() {}
    let _ = assert::<HostArray>;
    let _ = assert::<NativeMatrix<'static>>;
    let _ = assert::<NativeVector>;
    let _ = assert::<HostValue>;
    let _ = assert::<ConversionError>;
};
