use std::fmt;
use std::fmt::Write as _;

/// Dotted path to a node inside the configuration graph, e.g.
/// `config.db.password` or `config.services[api].auth`.
///
/// The walker extends the path in place on the way down and rewinds it on
/// the way back up, so both passes render identical paths for identical
/// positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPath(String);

impl FieldPath {
    pub(crate) fn root(label: &str) -> Self {
        Self(label.to_string())
    }

    pub(crate) fn mark(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn rewind(&mut self, mark: usize) {
        self.0.truncate(mark);
    }

    pub(crate) fn push_field(&mut self, name: &str) {
        self.0.push('.');
        self.0.push_str(name);
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        let _ = write!(self.0, "[{index}]");
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        let _ = write!(self.0, "[{key}]");
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
