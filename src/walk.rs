//! Shared traversal policy for the collect and replace passes.
//!
//! [`walk_ref`] and [`walk_mut`] must stay in lockstep: same kind dispatch,
//! same path extension, same map-key ordering. A leaf discovered at a path
//! by the read pass is revisited at the identical path by the write pass,
//! because nothing mutates the graph between the two.

use crate::errors::HydrateError;
use crate::node::{FieldMut, HydrateNode, MapNode, NodeMut, NodeRef};
use crate::path::FieldPath;

/// What the write pass hands to its callback at each visited leaf.
pub(crate) enum Slot<'a> {
    /// Writable string leaf.
    Leaf(&'a mut String),
    /// Leaf reached through a read-only record field.
    ReadOnlyLeaf(&'a str),
    /// A map entry its container refused to accept back after recursion.
    RejectedEntry,
}

/// Observational walk. The callback receives the path, the leaf text, and
/// whether the position is settable; returning an error aborts the walk.
pub(crate) fn walk_ref(
    node: &dyn HydrateNode,
    path: &mut FieldPath,
    settable: bool,
    visit: &mut dyn FnMut(&FieldPath, &str, bool) -> Result<(), HydrateError>,
) -> Result<(), HydrateError> {
    match node.node_ref() {
        NodeRef::Record(fields) => {
            for field in fields {
                let mark = path.mark();
                path.push_field(field.name);
                let result = walk_ref(field.node, path, settable && field.settable, visit);
                path.rewind(mark);
                result?;
            }
            Ok(())
        }
        NodeRef::Optional(Some(inner)) => walk_ref(inner, path, settable, visit),
        NodeRef::Optional(None) => Ok(()),
        NodeRef::Sequence(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let mark = path.mark();
                path.push_index(index);
                let result = walk_ref(item, path, settable, visit);
                path.rewind(mark);
                result?;
            }
            Ok(())
        }
        NodeRef::Map(map) => {
            for key in sorted_keys(map) {
                let Some(entry) = map.entry(&key) else {
                    continue;
                };
                let mark = path.mark();
                path.push_key(&key);
                let result = walk_ref(entry, path, settable, visit);
                path.rewind(mark);
                result?;
            }
            Ok(())
        }
        NodeRef::Leaf(text) => visit(path, text, settable),
        NodeRef::Scalar => Ok(()),
    }
}

/// Mutating walk. Map entries are taken out, recursed on as owned values,
/// and written back under their original key; the callback never aborts the
/// walk, so every leaf is visited exactly once.
pub(crate) fn walk_mut(
    node: &mut dyn HydrateNode,
    path: &mut FieldPath,
    visit: &mut dyn FnMut(&FieldPath, Slot<'_>),
) {
    match node.node_mut() {
        NodeMut::Record(fields) => {
            for field in fields {
                match field {
                    FieldMut::Settable { name, node } => {
                        let mark = path.mark();
                        path.push_field(name);
                        walk_mut(node, path, visit);
                        path.rewind(mark);
                    }
                    FieldMut::ReadOnly { name, node } => {
                        let mark = path.mark();
                        path.push_field(name);
                        walk_readonly(node, path, visit);
                        path.rewind(mark);
                    }
                }
            }
        }
        NodeMut::Optional(Some(inner)) => walk_mut(inner, path, visit),
        NodeMut::Optional(None) => {}
        NodeMut::Sequence(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let mark = path.mark();
                path.push_index(index);
                walk_mut(item, path, visit);
                path.rewind(mark);
            }
        }
        NodeMut::Map(map) => {
            for key in sorted_keys(&*map) {
                let Some(mut entry) = map.take_entry(&key) else {
                    continue;
                };
                let mark = path.mark();
                path.push_key(&key);
                walk_mut(entry.as_mut(), path, visit);
                // Written back unconditionally: a failed leaf inside the
                // entry must not drop its siblings' resolved values.
                if !map.put_entry(key.clone(), entry) {
                    visit(path, Slot::RejectedEntry);
                }
                path.rewind(mark);
            }
        }
        NodeMut::Leaf(text) => visit(path, Slot::Leaf(text)),
        NodeMut::Scalar => {}
    }
}

/// Read-only descent for subtrees behind read-only record fields; leaves
/// surface as [`Slot::ReadOnlyLeaf`] so the caller can diagnose them.
fn walk_readonly(
    node: &dyn HydrateNode,
    path: &mut FieldPath,
    visit: &mut dyn FnMut(&FieldPath, Slot<'_>),
) {
    match node.node_ref() {
        NodeRef::Record(fields) => {
            for field in fields {
                let mark = path.mark();
                path.push_field(field.name);
                walk_readonly(field.node, path, visit);
                path.rewind(mark);
            }
        }
        NodeRef::Optional(Some(inner)) => walk_readonly(inner, path, visit),
        NodeRef::Optional(None) => {}
        NodeRef::Sequence(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let mark = path.mark();
                path.push_index(index);
                walk_readonly(item, path, visit);
                path.rewind(mark);
            }
        }
        NodeRef::Map(map) => {
            for key in sorted_keys(map) {
                let Some(entry) = map.entry(&key) else {
                    continue;
                };
                let mark = path.mark();
                path.push_key(&key);
                walk_readonly(entry, path, visit);
                path.rewind(mark);
            }
        }
        NodeRef::Leaf(text) => visit(path, Slot::ReadOnlyLeaf(text)),
        NodeRef::Scalar => {}
    }
}

fn sorted_keys(map: &dyn MapNode) -> Vec<String> {
    let mut keys = map.keys();
    keys.sort_unstable();
    keys
}
