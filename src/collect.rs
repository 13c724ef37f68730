use std::collections::BTreeSet;

use crate::errors::HydrateError;
use crate::node::{HydrateNode, SECRET_PREFIX};
use crate::path::FieldPath;
use crate::walk::walk_ref;

/// Walks the graph and returns the distinct set of secret keys referenced
/// by placeholder leaves.
///
/// Purely observational. A placeholder found at a position the replace pass
/// will not be able to write aborts the whole collection, so a graph that
/// cannot be fully hydrated never reaches the fetch phase.
pub(crate) fn collect(root: &dyn HydrateNode) -> Result<BTreeSet<String>, HydrateError> {
    let mut keys = BTreeSet::new();
    let mut path = FieldPath::root("config");

    walk_ref(root, &mut path, true, &mut |path, leaf, settable| {
        let Some(key) = leaf.strip_prefix(SECRET_PREFIX) else {
            return Ok(());
        };
        if !settable {
            return Err(HydrateError::UnsettableField {
                path: path.to_string(),
            });
        }
        keys.insert(key.to_string());
        Ok(())
    })?;

    Ok(keys)
}
