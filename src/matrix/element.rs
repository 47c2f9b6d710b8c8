//! Native matrix element types.
//!
//! [`MatElement`] ties a Rust scalar to its native [`Depth`], to the [`MatData`] variant
//! that stores it and to its raw native-endian byte encoding. The seven implementations are
//! generated by `impl_mat_element!`.

use crate::{
    array::HostElement,
    dtype::Depth,
    matrix::{Buffer, MatData},
};

pub trait MatElement: HostElement + Copy {
    /// Native depth tag for this element type.
    const DEPTH: Depth;

    /// Encoded width in bytes.
    const BYTE_WIDTH: usize;

    /// Wrap a typed buffer into the matching [`MatData`] variant.
    fn wrap<'a>(buffer: Buffer<'a, Self>) -> MatData<'a>;

    /// Borrow the typed buffer if `data` stores this element type.
    fn buffer<'m, 'a>(data: &'m MatData<'a>) -> Option<&'m Buffer<'a, Self>>;

    /// Mutably borrow the typed buffer if `data` stores this element type.
    fn buffer_mut<'m, 'a>(data: &'m mut MatData<'a>) -> Option<&'m mut Buffer<'a, Self>>;

    /// Append the native-endian encoding of `self` to `out`.
    fn put_ne(self, out: &mut Vec<u8>);

    /// Decode one element from exactly [`Self::BYTE_WIDTH`] bytes.
    fn from_ne_chunk(chunk: &[u8]) -> Self;
}

macro_rules! impl_mat_element {
    ($ty:ty, $depth:ident) => {
        impl MatElement for $ty {
            const DEPTH: Depth = Depth::$depth;
            const BYTE_WIDTH: usize = std::mem::size_of::<$ty>();

            fn wrap<'a>(buffer: Buffer<'a, Self>) -> MatData<'a> {
                MatData::$depth(buffer)
            }

            fn buffer<'m, 'a>(data: &'m MatData<'a>) -> Option<&'m Buffer<'a, Self>> {
                match data {
                    MatData::$depth(buffer) => Some(buffer),
                    _ => None,
                }
            }

            fn buffer_mut<'m, 'a>(data: &'m mut MatData<'a>) -> Option<&'m mut Buffer<'a, Self>> {
                match data {
                    MatData::$depth(buffer) => Some(buffer),
                    _ => None,
                }
            }

            fn put_ne(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn from_ne_chunk(chunk: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(chunk);
                <$ty>::from_ne_bytes(raw)
            }
        }
    };
}

impl_mat_element!(u8, U8);
impl_mat_element!(i8, S8);
impl_mat_element!(u16, U16);
impl_mat_element!(i16, S16);
impl_mat_element!(i32, S32);
impl_mat_element!(f32, F32);
impl_mat_element!(f64, F64);
