//! Nested sequence inspection.
//!
//! [`inspect`] walks a [`HostValue`] once and decides whether it can become a native vector:
//! 1. depth: the deepest element must sit within `1..=MAX_VECTOR_DEPTH` levels
//! 2. leaves: there must be at least one scalar leaf
//! 3. uniformity: every leaf sits at the same depth, and no list sits at or below it
//! 4. leaf type: all booleans, or all numbers; integers mixed with floats promote to float
//!    when every integer is exactly representable as `f64`

use crate::{
    consts,
    error::{ConversionError, ConversionPath},
    shape::validate_vector_depth,
    vector::{HostValue, LeafType},
};

/// Depth and resolved leaf type of a convertible nested sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct VectorAttributes {
    pub depth: usize,
    pub leaf: LeafType,
}

#[derive(Default)]
struct Walk {
    /// Deepest level reached by a leaf, or implied by a list's children.
    max_depth: usize,
    /// Depth and type of the first leaf.
    first_leaf: Option<(usize, LeafType)>,
    /// Depth of the first leaf found somewhere else.
    off_depth: Option<usize>,
    /// First leaf whose kind differs from the first leaf's.
    off_kind: Option<LeafType>,
    has_int: bool,
    has_float: bool,
    max_int_magnitude: u64,
}

impl Walk {
    fn visit(&mut self, value: &HostValue, level: usize) {
        match value {
            HostValue::List(items) => {
                self.max_depth = self.max_depth.max(level + 1);
                // Anything further down is already out of range.
                if level >= consts::MAX_VECTOR_DEPTH {
                    return;
                }
                for item in items {
                    self.visit(item, level + 1);
                }
            }
            scalar => {
                let Some(leaf) = scalar.leaf_type() else {
                    return;
                };
                self.max_depth = self.max_depth.max(level);
                self.record_leaf(scalar, leaf, level);
            }
        }
    }

    fn record_leaf(&mut self, scalar: &HostValue, leaf: LeafType, level: usize) {
        match self.first_leaf {
            None => self.first_leaf = Some((level, leaf)),
            Some((depth, first)) => {
                if depth != level && self.off_depth.is_none() {
                    self.off_depth = Some(level);
                }
                if first.kind() != leaf.kind() && self.off_kind.is_none() {
                    self.off_kind = Some(leaf);
                }
            }
        }

        match *scalar {
            HostValue::Integer(i) => {
                self.has_int = true;
                self.max_int_magnitude = self.max_int_magnitude.max(i.unsigned_abs());
            }
            HostValue::Float(_) => self.has_float = true,
            _ => {}
        }
    }
}

/// Inspect a nested sequence without converting it.
///
/// # Errors
/// - [`ConversionError::UnsupportedRank`] for a scalar root, a sequence without leaves
///   (`rank: 0`), or nesting deeper than [`consts::MAX_VECTOR_DEPTH`]
/// - [`ConversionError::NonUniformDepth`] when leaves sit at different depths
/// - [`ConversionError::InconsistentElementType`] for booleans mixed with numbers, or
///   integers beyond `±2^53` mixed with floats
pub fn inspect(value: &HostValue) -> Result<VectorAttributes, ConversionError> {
    if !value.is_list() {
        return Err(ConversionError::UnsupportedRank {
            rank: 0,
            path: ConversionPath::Vector,
        });
    }

    let mut walk = Walk::default();
    walk.visit(value, 0);

    validate_vector_depth(walk.max_depth)?;

    let Some((depth, first)) = walk.first_leaf else {
        return Err(ConversionError::UnsupportedRank {
            rank: 0,
            path: ConversionPath::Vector,
        });
    };

    if let Some(found) = walk.off_depth {
        return Err(ConversionError::NonUniformDepth {
            expected: depth,
            found,
        });
    }
    if walk.max_depth != depth {
        return Err(ConversionError::NonUniformDepth {
            expected: depth,
            found: walk.max_depth,
        });
    }

    if let Some(conflicting) = walk.off_kind {
        return Err(ConversionError::InconsistentElementType { first, conflicting });
    }

    let leaf = match (walk.has_int, walk.has_float) {
        (true, true) => {
            if walk.max_int_magnitude > consts::MAX_EXACT_F64_INT.unsigned_abs() {
                let conflicting = if first == LeafType::Int {
                    LeafType::Float
                } else {
                    LeafType::Int
                };
                return Err(ConversionError::InconsistentElementType { first, conflicting });
            }
            LeafType::Float
        }
        _ => first,
    };

    Ok(VectorAttributes { depth, leaf })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(value: HostValue) -> VectorAttributes {
        inspect(&value).unwrap()
    }

    fn err(value: HostValue) -> ConversionError {
        match inspect(&value) {
            Ok(a) => panic!("expected error, got {:?}", a),
            Err(e) => e,
        }
    }

    #[test]
    fn reports_depth_and_leaf_type() {
        assert_eq!(
            attrs(HostValue::from(vec![true, false, true])),
            VectorAttributes {
                depth: 1,
                leaf: LeafType::Bool
            }
        );
        assert_eq!(
            attrs(HostValue::from(vec![vec![1i64, 2], vec![3]])),
            VectorAttributes {
                depth: 2,
                leaf: LeafType::Int
            }
        );
        assert_eq!(
            attrs(HostValue::from(vec![vec![vec![1.5f64]], vec![vec![2.5, 3.5]]])),
            VectorAttributes {
                depth: 3,
                leaf: LeafType::Float
            }
        );
    }

    #[test]
    fn empty_sub_sequences_above_leaf_depth_are_fine() {
        let value = HostValue::from(vec![vec![1i64], vec![]]);
        assert_eq!(attrs(value).depth, 2);
    }

    #[test]
    fn promotes_exact_integers_to_float() {
        let value = HostValue::List(vec![
            HostValue::Integer(1),
            HostValue::Float(2.5),
            HostValue::Integer(consts::MAX_EXACT_F64_INT),
        ]);
        assert_eq!(attrs(value).leaf, LeafType::Float);
    }

    #[test]
    fn rejects_inexact_integers_mixed_with_floats() {
        let value = HostValue::List(vec![
            HostValue::Float(0.5),
            HostValue::Integer(consts::MAX_EXACT_F64_INT + 1),
        ]);
        assert_eq!(
            err(value),
            ConversionError::InconsistentElementType {
                first: LeafType::Float,
                conflicting: LeafType::Int,
            }
        );

        // Without floats there is nothing to promote.
        let value = HostValue::from(vec![i64::MAX, i64::MIN]);
        assert_eq!(attrs(value).leaf, LeafType::Int);
    }

    #[test]
    fn rejects_mixed_kinds() {
        let value = HostValue::List(vec![HostValue::Boolean(true), HostValue::Integer(1)]);
        assert_eq!(
            err(value),
            ConversionError::InconsistentElementType {
                first: LeafType::Bool,
                conflicting: LeafType::Int,
            }
        );

        let nested = HostValue::List(vec![
            HostValue::from(vec![1.5f64]),
            HostValue::from(vec![false]),
        ]);
        assert_eq!(
            err(nested),
            ConversionError::InconsistentElementType {
                first: LeafType::Float,
                conflicting: LeafType::Bool,
            }
        );
    }

    #[test]
    fn rejects_non_uniform_depth() {
        let value = HostValue::List(vec![HostValue::Integer(1), HostValue::from(vec![2i64])]);
        assert_eq!(
            err(value),
            ConversionError::NonUniformDepth {
                expected: 1,
                found: 2
            }
        );

        let value = HostValue::List(vec![
            HostValue::from(vec![1i64]),
            HostValue::from(vec![Vec::<i64>::new()]),
        ]);
        assert_eq!(
            err(value),
            ConversionError::NonUniformDepth {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_scalars_and_leafless_sequences() {
        let rank_0 = ConversionError::UnsupportedRank {
            rank: 0,
            path: ConversionPath::Vector,
        };
        assert_eq!(err(HostValue::Integer(3)), rank_0);
        assert_eq!(err(HostValue::List(vec![])), rank_0);
        assert_eq!(err(HostValue::from(vec![Vec::<bool>::new()])), rank_0);
    }

    #[test]
    fn rejects_depth_beyond_three() {
        let value = HostValue::from(vec![vec![vec![vec![1i64]]]]);
        assert_eq!(
            err(value),
            ConversionError::UnsupportedRank {
                rank: 4,
                path: ConversionPath::Vector,
            }
        );

        let leafless = HostValue::from(vec![vec![vec![Vec::<f64>::new()]]]);
        assert!(matches!(
            err(leafless),
            ConversionError::UnsupportedRank { rank: 4, .. }
        ));
    }
}
