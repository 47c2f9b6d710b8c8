//! Element type registry.
//!
//! [`DataType`] tags host array elements, [`Depth`] tags native matrix elements. The mapping
//! between them is total over the supported set and never narrows:
//!
//! ```text
//! host   i8  u8  i16  u16  i32  f32  f64
//! native S8  U8  S16  U16  S32  F32  F64
//! ```
//!
//! `bool`, `i64`, `u32` and `u64` have no native matrix depth. Booleans are still accepted
//! on the vector path (see [`crate::vector::LeafType`]).

use std::ffi::c_long;

use crate::{
    consts,
    error::{ConversionError, ConversionPath},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
}

impl DataType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Bool => "bool",
        }
    }

    pub const fn item_size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Map a host element type to its native matrix depth.
    ///
    /// # Errors
    /// [`ConversionError::UnsupportedElementType`] for types without a lossless depth.
    pub fn to_native(self) -> Result<Depth, ConversionError> {
        match self {
            Self::I8 => Ok(Depth::S8),
            Self::U8 => Ok(Depth::U8),
            Self::I16 => Ok(Depth::S16),
            Self::U16 => Ok(Depth::U16),
            Self::I32 => Ok(Depth::S32),
            Self::F32 => Ok(Depth::F32),
            Self::F64 => Ok(Depth::F64),
            Self::I64 | Self::U32 | Self::U64 | Self::Bool => {
                Err(ConversionError::UnsupportedElementType {
                    dtype: self,
                    path: ConversionPath::Matrix,
                })
            }
        }
    }

    /// Parse a buffer-protocol format string (`"b"`, `"<f"`, `"=h"`, ...).
    ///
    /// An optional byte-order prefix is accepted as long as it denotes native byte order.
    /// `l`/`L` follow the platform's `long` width.
    ///
    /// # Errors
    /// [`ConversionError::UnsupportedFormat`] for anything that is not a single supported
    /// type character (half floats, chars, strings, pointers, padding, ...).
    pub fn from_format(format: &str) -> Result<Self, ConversionError> {
        let unsupported = || ConversionError::UnsupportedFormat {
            format: format.to_owned(),
        };

        let code = match format.as_bytes() {
            [code] => *code,
            [b'@' | b'=', code] => *code,
            [b'<', code] if cfg!(target_endian = "little") => *code,
            [b'>' | b'!', code] if cfg!(target_endian = "big") => *code,
            _ => return Err(unsupported()),
        };

        let long_is_64 = std::mem::size_of::<c_long>() == 8;
        let dtype = match code {
            b'b' => Self::I8,
            b'B' => Self::U8,
            b'h' => Self::I16,
            b'H' => Self::U16,
            b'i' => Self::I32,
            b'I' => Self::U32,
            b'l' if long_is_64 => Self::I64,
            b'l' => Self::I32,
            b'L' if long_is_64 => Self::U64,
            b'L' => Self::U32,
            b'q' => Self::I64,
            b'Q' => Self::U64,
            b'f' => Self::F32,
            b'd' => Self::F64,
            b'?' => Self::Bool,
            _ => return Err(unsupported()),
        };
        Ok(dtype)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Native matrix element depth.
///
/// Discriminants are the packed depth codes used in [`Depth::type_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Depth {
    U8 = 0,
    S8 = 1,
    U16 = 2,
    S16 = 3,
    S32 = 4,
    F32 = 5,
    F64 = 6,
}

impl Depth {
    pub const ALL: [Depth; 7] = [
        Self::U8,
        Self::S8,
        Self::U16,
        Self::S16,
        Self::S32,
        Self::F32,
        Self::F64,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "CV_8U",
            Self::S8 => "CV_8S",
            Self::U16 => "CV_16U",
            Self::S16 => "CV_16S",
            Self::S32 => "CV_32S",
            Self::F32 => "CV_32F",
            Self::F64 => "CV_64F",
        }
    }

    pub const fn item_size(self) -> usize {
        self.to_host().item_size()
    }

    /// Total.
    pub const fn to_host(self) -> DataType {
        match self {
            Self::U8 => DataType::U8,
            Self::S8 => DataType::I8,
            Self::U16 => DataType::U16,
            Self::S16 => DataType::I16,
            Self::S32 => DataType::I32,
            Self::F32 => DataType::F32,
            Self::F64 => DataType::F64,
        }
    }

    /// Packed `(depth, channels)` type code: `depth + ((channels - 1) << 3)`.
    pub const fn type_code(self, channels: usize) -> usize {
        let channels = if channels == 0 { 1 } else { channels };
        self as usize + ((channels - 1) << consts::CHANNEL_SHIFT)
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
