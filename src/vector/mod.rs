//! Nested sequences <-> native nested vectors.
//!
//! A [`HostValue`] is an arbitrarily nested host sequence of booleans, integers and floats.
//! A [`NativeVector`] is its native counterpart: one to three levels of dynamically sized
//! vectors over a single leaf type. Sibling sequences may have different lengths; the native
//! side is a recursive [`VectorNode`] tree, not a rectangular array.
//!
//! Vectors are always copied in both directions. There is no aliasing mode.

pub mod attributes;
pub mod marshal;

use std::fmt;

pub use attributes::{VectorAttributes, inspect};
pub use marshal::{from_native_vector, to_native_vector};

/// Host-side nested sequence.
///
/// Deserializes from plain JSON: `true`, `3`, `-17.1`, `[[1, 2], [3]]`. Integers outside
/// the `i64` range are rejected rather than read as floats.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum HostValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    List(Vec<HostValue>),
}

struct HostValueVisitor;

impl<'de> serde::de::Visitor<'de> for HostValueVisitor {
    type Value = HostValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, an i64 integer, a float or a sequence of those")
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<HostValue, E> {
        Ok(HostValue::Boolean(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<HostValue, E> {
        Ok(HostValue::Integer(v))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<HostValue, E> {
        i64::try_from(v).map(HostValue::Integer).map_err(|_| {
            E::invalid_value(serde::de::Unexpected::Unsigned(v), &"an integer within the i64 range")
        })
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<HostValue, E> {
        Ok(HostValue::Float(v))
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<HostValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(HostValue::List(items))
    }
}

impl<'de> serde::Deserialize<'de> for HostValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HostValueVisitor)
    }
}

impl HostValue {
    /// Leaf type of a scalar, `None` for a list.
    pub const fn leaf_type(&self) -> Option<LeafType> {
        match self {
            Self::Boolean(_) => Some(LeafType::Bool),
            Self::Integer(_) => Some(LeafType::Int),
            Self::Float(_) => Some(LeafType::Float),
            Self::List(_) => None,
        }
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Leaf kind requested by the caller of [`to_native_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Boolean,
    Numeric,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Numeric => write!(f, "numeric"),
        }
    }
}

/// Resolved leaf type of a nested sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    Bool,
    Int,
    Float,
}

impl LeafType {
    pub const fn kind(self) -> ElementKind {
        match self {
            Self::Bool => ElementKind::Boolean,
            Self::Int | Self::Float => ElementKind::Numeric,
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
        }
    }
}

/// One element of a native vector: a leaf, or a nested vector.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum VectorNode<T> {
    Leaf(T),
    Node(Vec<VectorNode<T>>),
}

/// Leaf types a [`NativeVector`] can hold.
pub trait VectorLeaf: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    const LEAF: LeafType;

    /// Read a host scalar. Integers are accepted by `f64` once promotion has been checked.
    fn from_host(value: &HostValue) -> Option<Self>;

    fn into_host(self) -> HostValue;

    fn wrap(nodes: Vec<VectorNode<Self>>) -> VectorData;

    fn fmt_leaf(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl VectorLeaf for bool {
    const LEAF: LeafType = LeafType::Bool;

    fn from_host(value: &HostValue) -> Option<Self> {
        match *value {
            HostValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    fn into_host(self) -> HostValue {
        HostValue::Boolean(self)
    }

    fn wrap(nodes: Vec<VectorNode<Self>>) -> VectorData {
        VectorData::Bool(nodes)
    }

    fn fmt_leaf(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl VectorLeaf for i64 {
    const LEAF: LeafType = LeafType::Int;

    fn from_host(value: &HostValue) -> Option<Self> {
        match *value {
            HostValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    fn into_host(self) -> HostValue {
        HostValue::Integer(self)
    }

    fn wrap(nodes: Vec<VectorNode<Self>>) -> VectorData {
        VectorData::Int(nodes)
    }

    fn fmt_leaf(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl VectorLeaf for f64 {
    const LEAF: LeafType = LeafType::Float;

    fn from_host(value: &HostValue) -> Option<Self> {
        match *value {
            HostValue::Float(x) => Some(x),
            HostValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }

    fn into_host(self) -> HostValue {
        HostValue::Float(self)
    }

    fn wrap(nodes: Vec<VectorNode<Self>>) -> VectorData {
        VectorData::Float(nodes)
    }

    // `{:?}` prints the shortest representation that parses back to the same bits.
    fn fmt_leaf(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Top-level elements of a native vector, one variant per leaf type.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Bool(Vec<VectorNode<bool>>),
    Int(Vec<VectorNode<i64>>),
    Float(Vec<VectorNode<f64>>),
}

impl VectorData {
    pub const fn leaf_type(&self) -> LeafType {
        match self {
            Self::Bool(_) => LeafType::Bool,
            Self::Int(_) => LeafType::Int,
            Self::Float(_) => LeafType::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(nodes) => nodes.len(),
            Self::Int(nodes) => nodes.len(),
            Self::Float(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A native nested vector, `depth` levels deep. Always owns its elements.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeVector {
    depth: usize,
    data: VectorData,
}

impl NativeVector {
    pub(crate) fn from_nodes<T: VectorLeaf>(depth: usize, nodes: Vec<VectorNode<T>>) -> Self {
        Self {
            depth,
            data: T::wrap(nodes),
        }
    }

    /// Nesting depth, 1 to 3.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub const fn leaf_type(&self) -> LeafType {
        self.data.leaf_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub const fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn deep_clone(&self) -> NativeVector {
        self.clone()
    }

    /// Copy into `dst`, reusing its allocations where the shapes line up.
    pub fn copy_to(&self, dst: &mut NativeVector) {
        dst.clone_from(self);
        tracing::trace!(depth = self.depth, len = self.len(), "copied native vector");
    }
}

impl Default for NativeVector {
    /// An empty, one-level integer vector.
    fn default() -> Self {
        Self::from_nodes::<i64>(1, Vec::new())
    }
}

fn fmt_nodes<T: VectorLeaf>(nodes: &[VectorNode<T>], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[")?;
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match node {
            VectorNode::Leaf(value) => value.fmt_leaf(f)?,
            VectorNode::Node(children) => fmt_nodes(children, f)?,
        }
    }
    write!(f, "]")
}

impl fmt::Display for NativeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            VectorData::Bool(nodes) => fmt_nodes(nodes, f),
            VectorData::Int(nodes) => fmt_nodes(nodes, f),
            VectorData::Float(nodes) => fmt_nodes(nodes, f),
        }
    }
}
