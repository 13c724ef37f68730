use tracing::warn;

use crate::errors::{AggregateError, Diagnostic, DiagnosticCause, HydrateError};
use crate::node::{HydrateNode, SECRET_PREFIX};
use crate::path::FieldPath;
use crate::resolve::Outcomes;
use crate::walk::{Slot, walk_mut};

/// Re-walks the graph and writes resolved values over their placeholder
/// leaves.
///
/// A leaf whose key failed keeps its placeholder verbatim and contributes a
/// `(path, key, cause)` diagnostic; the walk always runs to completion so
/// one missing secret cannot hide another. Returns the joined diagnostics
/// if any leaf could not be hydrated.
pub(crate) fn replace(root: &mut dyn HydrateNode, outcomes: &Outcomes) -> Result<(), HydrateError> {
    let mut failures: Vec<Diagnostic> = Vec::new();
    let mut path = FieldPath::root("config");

    walk_mut(root, &mut path, &mut |path, slot| match slot {
        Slot::Leaf(leaf) => {
            let Some(key) = leaf.strip_prefix(SECRET_PREFIX).map(str::to_owned) else {
                return;
            };
            match outcomes.get(&key) {
                Some(Ok(value)) => *leaf = value.clone(),
                Some(Err(cause)) => {
                    warn!(path = %path, key = %key, "leaving placeholder unresolved");
                    failures.push(Diagnostic {
                        path: path.to_string(),
                        key: Some(key),
                        cause: DiagnosticCause::Fetch(cause.clone()),
                    });
                }
                None => failures.push(Diagnostic {
                    path: path.to_string(),
                    key: Some(key),
                    cause: DiagnosticCause::MissingOutcome,
                }),
            }
        }
        Slot::ReadOnlyLeaf(text) => {
            let Some(key) = text.strip_prefix(SECRET_PREFIX) else {
                return;
            };
            failures.push(Diagnostic {
                path: path.to_string(),
                key: Some(key.to_string()),
                cause: DiagnosticCause::Unsettable,
            });
        }
        Slot::RejectedEntry => failures.push(Diagnostic {
            path: path.to_string(),
            key: None,
            cause: DiagnosticCause::EntryRejected,
        }),
    });

    if failures.is_empty() {
        Ok(())
    } else {
        Err(HydrateError::Aggregate(AggregateError::new(failures)))
    }
}
