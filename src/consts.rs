use std::ops::RangeInclusive;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ranks a host array may have to be converted into a native matrix:
///     2 => rows x cols (single channel)
///     3 => rows x cols x channels
///
pub const MATRIX_RANKS: RangeInclusive<usize> = 2..=3;

/// Largest channel count a native matrix element can carry.
pub const MAX_CHANNELS: usize = 512;

/// Number of bits the channel count is shifted by in a packed matrix type code.
pub const CHANNEL_SHIFT: u32 = 3;

/// Deepest nesting a native vector supports:
///     1 => vector<T>
///     2 => vector<vector<T>>
///     3 => vector<vector<vector<T>>>
///
pub const MAX_VECTOR_DEPTH: usize = 3;

/// Largest integer magnitude that survives an `i64 -> f64 -> i64` round trip.
pub const MAX_EXACT_F64_INT: i64 = 1 << 53;
