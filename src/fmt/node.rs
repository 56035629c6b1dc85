//! Display-node decomposition
//!
//! This module defines the tree of display nodes a value is decomposed into
//! before rendering, and the [`Decompose`] trait that performs the
//! decomposition. Node trees are built fresh per render call and discarded
//! afterwards.

use std::collections::{BTreeMap, HashMap};

/// Token emitted for values with no textual representation
pub const UNPRINTABLE: &str = "<unprintable>";

/// Kind of a display node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A leaf value with a token text
    Scalar,
    /// An ordered collection, rendered with `[` `]`
    Sequence,
    /// A key-value collection, rendered with `{` `}`
    Mapping,
    /// A composite with named fields, rendered as `Name(` `)`
    Object,
}

/// One renderable unit of a decomposed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub kind: NodeKind,
    /// Key or field label token, set on children of mappings and objects
    pub label: Option<String>,
    /// Scalar token text, or the type name for objects
    pub text: String,
    /// Ordered children, empty for scalars
    pub children: Vec<DisplayNode>,
    /// Nesting level; root is 0, every child is its parent's depth + 1
    pub depth: usize,
}

impl DisplayNode {
    /// Leaf node with a token text
    pub fn scalar(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Scalar,
            label: None,
            text: text.into(),
            children: Vec::new(),
            depth: 0,
        }
    }

    /// Ordered collection node
    pub fn sequence(children: Vec<DisplayNode>) -> Self {
        Self {
            kind: NodeKind::Sequence,
            label: None,
            text: String::new(),
            children,
            depth: 0,
        }
    }

    /// Key-value collection node. Entry order is preserved as given.
    pub fn mapping(entries: Vec<(String, DisplayNode)>) -> Self {
        let children = entries
            .into_iter()
            .map(|(key, mut value)| {
                value.label = Some(key);
                value
            })
            .collect();
        Self {
            kind: NodeKind::Mapping,
            label: None,
            text: String::new(),
            children,
            depth: 0,
        }
    }

    /// Composite node with a type name and named fields in declaration order
    pub fn object(name: impl Into<String>, fields: Vec<(&str, DisplayNode)>) -> Self {
        let children = fields
            .into_iter()
            .map(|(field, mut value)| {
                value.label = Some(field.to_string());
                value
            })
            .collect();
        Self {
            kind: NodeKind::Object,
            label: None,
            text: name.into(),
            children,
            depth: 0,
        }
    }

    /// Fallback node for values with no textual representation
    pub fn opaque() -> Self {
        Self::scalar(UNPRINTABLE)
    }

    /// Whether this node is a collection kind
    pub fn is_container(&self) -> bool {
        !matches!(self.kind, NodeKind::Scalar)
    }

    /// Assign depths so the root is `depth` and each child is one deeper
    pub fn assign_depths(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.assign_depths(depth + 1);
        }
    }

    /// Scalar token of this node if it is a leaf, used for key rendering
    fn scalar_token(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Scalar => Some(&self.text),
            _ => None,
        }
    }
}

/// Decomposes a value into a [`DisplayNode`] tree.
///
/// Implemented for the std scalar and collection types; composite types
/// implement it by hand with [`DisplayNode::object`]:
///
/// ```
/// use themed_print::{Decompose, DisplayNode};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Decompose for Point {
///     fn decompose(&self) -> DisplayNode {
///         DisplayNode::object(
///             "Point",
///             vec![("x", self.x.decompose()), ("y", self.y.decompose())],
///         )
///     }
/// }
/// ```
pub trait Decompose {
    fn decompose(&self) -> DisplayNode;
}

impl<T: Decompose + ?Sized> Decompose for &T {
    fn decompose(&self) -> DisplayNode {
        (**self).decompose()
    }
}

macro_rules! impl_decompose_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decompose for $ty {
                fn decompose(&self) -> DisplayNode {
                    DisplayNode::scalar(self.to_string())
                }
            }
        )*
    };
}

impl_decompose_display!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool,
);

impl Decompose for str {
    fn decompose(&self) -> DisplayNode {
        DisplayNode::scalar(format!("{:?}", self))
    }
}

impl Decompose for String {
    fn decompose(&self) -> DisplayNode {
        self.as_str().decompose()
    }
}

impl Decompose for char {
    fn decompose(&self) -> DisplayNode {
        DisplayNode::scalar(format!("{:?}", self))
    }
}

impl Decompose for DisplayNode {
    fn decompose(&self) -> DisplayNode {
        self.clone()
    }
}

/// `None` renders as the `None` token; `Some` is transparent
impl<T: Decompose> Decompose for Option<T> {
    fn decompose(&self) -> DisplayNode {
        match self {
            Some(value) => value.decompose(),
            None => DisplayNode::scalar("None"),
        }
    }
}

impl<T: Decompose> Decompose for [T] {
    fn decompose(&self) -> DisplayNode {
        DisplayNode::sequence(self.iter().map(Decompose::decompose).collect())
    }
}

impl<T: Decompose> Decompose for Vec<T> {
    fn decompose(&self) -> DisplayNode {
        self.as_slice().decompose()
    }
}

impl<T: Decompose, const N: usize> Decompose for [T; N] {
    fn decompose(&self) -> DisplayNode {
        self.as_slice().decompose()
    }
}

macro_rules! impl_decompose_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Decompose),+> Decompose for ($($name,)+) {
            fn decompose(&self) -> DisplayNode {
                DisplayNode::sequence(vec![$(self.$idx.decompose()),+])
            }
        }
    };
}

impl_decompose_tuple!(A: 0, B: 1);
impl_decompose_tuple!(A: 0, B: 1, C: 2);
impl_decompose_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_decompose_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_decompose_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// Map keys become label tokens. Non-scalar keys fall back to the
// unprintable token rather than failing the render.
fn map_entry<K: Decompose, V: Decompose>(key: &K, value: &V) -> (String, DisplayNode) {
    let key_node = key.decompose();
    let label = key_node
        .scalar_token()
        .unwrap_or(UNPRINTABLE)
        .to_string();
    (label, value.decompose())
}

/// Iteration order is preserved as given by the map, never re-sorted here
impl<K: Decompose, V: Decompose> Decompose for BTreeMap<K, V> {
    fn decompose(&self) -> DisplayNode {
        DisplayNode::mapping(self.iter().map(|(k, v)| map_entry(k, v)).collect())
    }
}

impl<K: Decompose, V: Decompose, S: std::hash::BuildHasher> Decompose for HashMap<K, V, S> {
    fn decompose(&self) -> DisplayNode {
        DisplayNode::mapping(self.iter().map(|(k, v)| map_entry(k, v)).collect())
    }
}
