//! Nested sequence <-> native vector conversion. Both directions copy.

use crate::{
    error::{ConversionError, ConversionPath},
    vector::{
        ElementKind, HostValue, LeafType, NativeVector, VectorData, VectorLeaf, VectorNode,
        attributes::inspect,
    },
};

/// Convert a nested host sequence into a native vector of the requested kind.
///
/// Ragged siblings and empty sub-sequences above the leaf depth are preserved as-is.
///
/// # Errors
/// - everything [`inspect`] rejects
/// - [`ConversionError::ElementKindMismatch`] when the leaves are not of `kind`
pub fn to_native_vector(
    value: &HostValue,
    kind: ElementKind,
) -> Result<NativeVector, ConversionError> {
    let attrs = inspect(value)?;
    if attrs.leaf.kind() != kind {
        return Err(ConversionError::ElementKindMismatch {
            requested: kind,
            found: attrs.leaf.kind(),
        });
    }

    tracing::debug!(
        depth = attrs.depth,
        leaf = %attrs.leaf,
        %kind,
        "converting nested sequence to native vector"
    );

    let HostValue::List(items) = value else {
        return Err(ConversionError::UnsupportedRank {
            rank: 0,
            path: ConversionPath::Vector,
        });
    };

    let vector = match attrs.leaf {
        LeafType::Bool => NativeVector::from_nodes(attrs.depth, nodes_from_host::<bool>(items)?),
        LeafType::Int => NativeVector::from_nodes(attrs.depth, nodes_from_host::<i64>(items)?),
        LeafType::Float => NativeVector::from_nodes(attrs.depth, nodes_from_host::<f64>(items)?),
    };
    Ok(vector)
}

/// Rebuild the nested host sequence, with the same depth and per-node lengths.
pub fn from_native_vector(vector: &NativeVector) -> HostValue {
    tracing::debug!(
        depth = vector.depth(),
        leaf = %vector.leaf_type(),
        len = vector.len(),
        "converting native vector to nested sequence"
    );

    match vector.data() {
        VectorData::Bool(nodes) => nodes_to_host(nodes),
        VectorData::Int(nodes) => nodes_to_host(nodes),
        VectorData::Float(nodes) => nodes_to_host(nodes),
    }
}

fn nodes_from_host<T: VectorLeaf>(items: &[HostValue]) -> Result<Vec<VectorNode<T>>, ConversionError> {
    items
        .iter()
        .map(|item| match item {
            HostValue::List(children) => Ok(VectorNode::Node(nodes_from_host(children)?)),
            scalar => T::from_host(scalar).map(VectorNode::Leaf).ok_or_else(|| {
                ConversionError::InconsistentElementType {
                    first: T::LEAF,
                    conflicting: scalar.leaf_type().unwrap_or(T::LEAF),
                }
            }),
        })
        .collect()
}

fn nodes_to_host<T: VectorLeaf>(nodes: &[VectorNode<T>]) -> HostValue {
    HostValue::List(
        nodes
            .iter()
            .map(|node| match node {
                VectorNode::Leaf(value) => value.clone().into_host(),
                VectorNode::Node(children) => nodes_to_host(children),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: HostValue, kind: ElementKind) -> HostValue {
        let native = to_native_vector(&value, kind).unwrap();
        from_native_vector(&native)
    }

    #[test]
    fn bool_depth_1() {
        let value = HostValue::from(vec![true, false, true]);
        assert_eq!(roundtrip(value.clone(), ElementKind::Boolean), value);
    }

    #[test]
    fn float_depth_2() {
        let value = HostValue::from(vec![vec![1.2f64, 2.3, 3.4], vec![4.5, 5.6, 6.7]]);
        let native = to_native_vector(&value, ElementKind::Numeric).unwrap();
        assert_eq!(native.depth(), 2);
        assert_eq!(native.leaf_type(), LeafType::Float);
        assert_eq!(from_native_vector(&native), value);
    }

    #[test]
    fn ragged_int_depth_3() {
        let value = HostValue::from(vec![
            vec![vec![1i64, -2, 3], vec![4]],
            vec![],
            vec![vec![], vec![-17, 18, 19, 20]],
        ]);
        let native = to_native_vector(&value, ElementKind::Numeric).unwrap();
        assert_eq!(native.depth(), 3);
        assert_eq!(native.len(), 3);
        assert_eq!(native.to_string(), "[[[1, -2, 3], [4]], [], [[], [-17, 18, 19, 20]]]");
        assert_eq!(from_native_vector(&native), value);
    }

    #[test]
    fn promoted_integers_come_back_as_floats() {
        let value = HostValue::List(vec![HostValue::Integer(2), HostValue::Float(-17.1)]);
        assert_eq!(
            roundtrip(value, ElementKind::Numeric),
            HostValue::from(vec![2.0f64, -17.1])
        );
    }

    #[test]
    fn requested_kind_must_match() {
        let bools = HostValue::from(vec![true]);
        assert_eq!(
            to_native_vector(&bools, ElementKind::Numeric),
            Err(ConversionError::ElementKindMismatch {
                requested: ElementKind::Numeric,
                found: ElementKind::Boolean,
            })
        );

        let ints = HostValue::from(vec![vec![1i64]]);
        assert_eq!(
            to_native_vector(&ints, ElementKind::Boolean),
            Err(ConversionError::ElementKindMismatch {
                requested: ElementKind::Boolean,
                found: ElementKind::Numeric,
            })
        );
    }

    #[test]
    fn inspection_errors_propagate() {
        let deep = HostValue::from(vec![vec![vec![vec![true]]]]);
        assert!(matches!(
            to_native_vector(&deep, ElementKind::Boolean),
            Err(ConversionError::UnsupportedRank { rank: 4, .. })
        ));

        let mixed = HostValue::List(vec![HostValue::Float(1.0), HostValue::Boolean(false)]);
        assert!(matches!(
            to_native_vector(&mixed, ElementKind::Numeric),
            Err(ConversionError::InconsistentElementType { .. })
        ));
    }
}
