//! [`HydrateNode`] support for free-form `serde_json::Value` sections.
//!
//! JSON objects traverse as associative maps, arrays as sequences, strings
//! as leaves, and `null` as an absent optional. A `Value` is not a record,
//! so it cannot be the hydration root on its own; embed it as a field of a
//! record type.

use serde_json::{Map, Value};
use std::any::Any;

use crate::node::{HydrateNode, MapNode, NodeMut, NodeRef};

impl HydrateNode for Value {
    fn node_ref(&self) -> NodeRef<'_> {
        match self {
            Value::Object(map) => NodeRef::Map(map),
            Value::Array(items) => {
                NodeRef::Sequence(items.iter().map(|item| item as &dyn HydrateNode).collect())
            }
            Value::String(text) => NodeRef::Leaf(text),
            Value::Null => NodeRef::Optional(None),
            Value::Bool(_) | Value::Number(_) => NodeRef::Scalar,
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        match self {
            Value::Object(map) => NodeMut::Map(map),
            Value::Array(items) => NodeMut::Sequence(
                items
                    .iter_mut()
                    .map(|item| item as &mut dyn HydrateNode)
                    .collect(),
            ),
            Value::String(text) => NodeMut::Leaf(text),
            Value::Null => NodeMut::Optional(None),
            Value::Bool(_) | Value::Number(_) => NodeMut::Scalar,
        }
    }
}

impl MapNode for Map<String, Value> {
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
        match entry.downcast::<Value>() {
            Ok(value) => {
                self.insert(key, *value);
                true
            }
            Err(_) => false,
        }
    }
}
