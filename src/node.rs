//! The closed set of node kinds the traversal understands.
//!
//! A configuration graph is anything that implements [`HydrateNode`]: the
//! trait projects a value into one of six kinds (record, optional,
//! sequence, associative map, string leaf, or opaque scalar) and the
//! walker recurses on that projection alone. Container and scalar types
//! are covered by the blanket implementations below; record types opt in
//! through the [`hydrate_record!`](crate::hydrate_record) macro.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

/// Marker identifying a string leaf as a secret placeholder. The text after
/// the prefix, taken verbatim, is the secret key.
pub const SECRET_PREFIX: &str = "$SECRET:";

/// A value the hydration engine can traverse.
///
/// The two projections must agree: a leaf reported at some position by
/// [`node_ref`](Self::node_ref) has to appear at the same position in
/// [`node_mut`](Self::node_mut), since the collect pass plans the work the
/// replace pass performs.
pub trait HydrateNode: Any {
    /// Shared view used by the observational collect pass.
    fn node_ref(&self) -> NodeRef<'_>;

    /// Mutable view used by the replace pass.
    fn node_mut(&mut self) -> NodeMut<'_>;
}

/// Shared projection of a node.
pub enum NodeRef<'a> {
    /// Named fields, in declaration order.
    Record(Vec<FieldRef<'a>>),
    /// Present-or-absent wrapper; absence stops the walk without error.
    Optional(Option<&'a dyn HydrateNode>),
    /// Ordered, indexable elements.
    Sequence(Vec<&'a dyn HydrateNode>),
    /// Keyed entries that are not independently addressable.
    Map(&'a dyn MapNode),
    /// String leaf, the only kind that can carry a placeholder.
    Leaf(&'a str),
    /// Anything else; never touched.
    Scalar,
}

impl NodeRef<'_> {
    /// Human-readable kind label for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeRef::Record(_) => "record",
            NodeRef::Optional(_) => "optional",
            NodeRef::Sequence(_) => "sequence",
            NodeRef::Map(_) => "map",
            NodeRef::Leaf(_) => "string",
            NodeRef::Scalar => "scalar",
        }
    }
}

/// Mutable projection of a node, mirroring [`NodeRef`] variant for variant.
pub enum NodeMut<'a> {
    Record(Vec<FieldMut<'a>>),
    Optional(Option<&'a mut dyn HydrateNode>),
    Sequence(Vec<&'a mut dyn HydrateNode>),
    Map(&'a mut dyn MapNode),
    Leaf(&'a mut String),
    Scalar,
}

/// One record field in the shared view.
pub struct FieldRef<'a> {
    pub name: &'static str,
    /// Whether the replace pass will be able to write into this field.
    /// Placeholders found under a non-settable field abort collection.
    pub settable: bool,
    pub node: &'a dyn HydrateNode,
}

/// One record field in the mutable view.
pub enum FieldMut<'a> {
    Settable {
        name: &'static str,
        node: &'a mut dyn HydrateNode,
    },
    ReadOnly {
        name: &'static str,
        node: &'a dyn HydrateNode,
    },
}

/// Associative container whose entries are exposed by value, never by
/// mutable reference.
///
/// The replace pass therefore has to take an entry out, mutate the owned
/// copy, and put it back under its original key, transitively for nested
/// maps. `put_entry` must accept any box previously produced by
/// `take_entry` on the same container and returns whether it did.
pub trait MapNode {
    fn keys(&self) -> Vec<String>;

    fn entry(&self, key: &str) -> Option<&dyn HydrateNode>;

    fn take_entry(&mut self, key: &str) -> Option<Box<dyn HydrateNode>>;

    #[must_use]
    fn put_entry(&mut self, key: String, entry: Box<dyn HydrateNode>) -> bool;
}

impl HydrateNode for String {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Leaf(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Leaf(self)
    }
}

impl<T: HydrateNode> HydrateNode for Option<T> {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Optional(self.as_ref().map(|inner| inner as &dyn HydrateNode))
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Optional(self.as_mut().map(|inner| inner as &mut dyn HydrateNode))
    }
}

impl<T: HydrateNode + ?Sized> HydrateNode for Box<T> {
    fn node_ref(&self) -> NodeRef<'_> {
        (**self).node_ref()
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        (**self).node_mut()
    }
}

impl<T: HydrateNode> HydrateNode for Vec<T> {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self.iter().map(|item| item as &dyn HydrateNode).collect())
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(
            self.iter_mut()
                .map(|item| item as &mut dyn HydrateNode)
                .collect(),
        )
    }
}

impl<T: HydrateNode, const N: usize> HydrateNode for [T; N] {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self.iter().map(|item| item as &dyn HydrateNode).collect())
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(
            self.iter_mut()
                .map(|item| item as &mut dyn HydrateNode)
                .collect(),
        )
    }
}

impl<T: HydrateNode> HydrateNode for HashMap<String, T> {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl<T: HydrateNode> MapNode for HashMap<String, T> {
    fn keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn entry(&self, key: &str) -> Option<&dyn HydrateNode> {
        self.get(key).map(|value| value as &dyn HydrateNode)
    }

    fn take_entry(&mut self, key: &str) -> Option<Box<dyn HydrateNode>> {
        self.remove(key)
            .map(|value| Box::new(value) as Box<dyn HydrateNode>)
    }

    fn put_entry(&mut self, key: String, entry: Box<dyn HydrateNode>) -> bool {
        let entry: Box<dyn Any> = entry;
        match entry.downcast::<T>() {
            Ok(value) => {
                self.insert(key, *value);
                true
            }
            Err(_) => false,
        }
    }
}

impl<T: HydrateNode> HydrateNode for BTreeMap<String, T> {
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }
}

impl<T: HydrateNode> MapNode for BTreeMap<String, T> {
    fn keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn entry(&self, key: &str) -> Option<&dyn HydrateNode> {
        self.get(key).map(|value| value as &dyn HydrateNode)
    }

    fn take_entry(&mut self, key: &str) -> Option<Box<dyn HydrateNode>> {
        self.remove(key)
            .map(|value| Box::new(value) as Box<dyn HydrateNode>)
    }

    fn put_entry(&mut self, key: String, entry: Box<dyn HydrateNode>) -> bool {
        let entry: Box<dyn Any> = entry;
        match entry.downcast::<T>() {
            Ok(value) => {
                self.insert(key, *value);
                true
            }
            Err(_) => false,
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HydrateNode for $ty {
                fn node_ref(&self) -> NodeRef<'_> {
                    NodeRef::Scalar
                }

                fn node_mut(&mut self) -> NodeMut<'_> {
                    NodeMut::Scalar
                }
            }
        )*
    };
}

impl_scalar!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    std::path::PathBuf,
    std::time::Duration,
);

/// Implements [`HydrateNode`] for a record (struct) type.
///
/// Fields listed in the main group are visited and writable; fields in the
/// optional `readonly` group are still visited by the collect pass, and a
/// placeholder found inside one is a structural error. Fields not listed at
/// all are invisible to hydration.
///
/// ```
/// use cloudsecrets::hydrate_record;
///
/// #[derive(Default)]
/// struct DbConfig {
///     host: String,
///     password: String,
///     build_tag: String,
/// }
///
/// hydrate_record!(DbConfig { host, password } readonly { build_tag });
/// ```
#[macro_export]
macro_rules! hydrate_record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        $crate::hydrate_record!($ty { $($field),* } readonly {});
    };
    ($ty:ty { $($field:ident),* $(,)? } readonly { $($frozen:ident),* $(,)? }) => {
        impl $crate::node::HydrateNode for $ty {
            fn node_ref(&self) -> $crate::node::NodeRef<'_> {
                $crate::node::NodeRef::Record(::std::vec![
                    $(
                        $crate::node::FieldRef {
                            name: ::std::stringify!($field),
                            settable: true,
                            node: &self.$field,
                        },
                    )*
                    $(
                        $crate::node::FieldRef {
                            name: ::std::stringify!($frozen),
                            settable: false,
                            node: &self.$frozen,
                        },
                    )*
                ])
            }

            fn node_mut(&mut self) -> $crate::node::NodeMut<'_> {
                $crate::node::NodeMut::Record(::std::vec![
                    $(
                        $crate::node::FieldMut::Settable {
                            name: ::std::stringify!($field),
                            node: &mut self.$field,
                        },
                    )*
                    $(
                        $crate::node::FieldMut::ReadOnly {
                            name: ::std::stringify!($frozen),
                            node: &self.$frozen,
                        },
                    )*
                ])
            }
        }
    };
}
