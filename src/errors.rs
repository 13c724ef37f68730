use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HydrateError>;

/// Errors surfaced by a hydrate call. Any non-success return means the
/// configuration still contains placeholders and must not be used.
#[derive(Debug, Error)]
pub enum HydrateError {
    /// The root did not resolve, through any optional chain, to a record.
    #[error("config root must be a record, got {kind}")]
    InvalidInput { kind: &'static str },

    /// A placeholder sits at a position the replace pass cannot write.
    /// Raised during collection; nothing is fetched or mutated.
    #[error("placeholder at {path} cannot be written back")]
    UnsettableField { path: String },

    /// The provider selector named a backend this crate does not know.
    #[error("unsupported provider {0:?}")]
    UnknownProvider(String),

    /// The selected backend exists but its cargo feature is disabled.
    #[error("provider {name:?} requires the {feature:?} cargo feature")]
    ProviderUnavailable {
        name: &'static str,
        feature: &'static str,
    },

    /// Backend construction failed, typically missing environment config.
    #[error("building {name} provider: {reason}")]
    ProviderInit { name: &'static str, reason: String },

    /// One or more placeholder leaves could not be resolved.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Per-key failure reported by a provider or by the resolver's timeout
/// guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("secret {0:?} not found")]
    NotFound(String),

    #[error("secret found but no secrets provider was configured")]
    NoProvider,

    #[error("fetching secret {key:?} timed out after {limit:?}")]
    TimedOut { key: String, limit: Duration },

    #[error("backend error: {0}")]
    Backend(String),
}

/// One failed leaf: where it is, which key it wanted, and why it failed.
#[derive(Debug, Clone, Error)]
#[error("{path}: {cause}")]
pub struct Diagnostic {
    pub path: String,
    pub key: Option<String>,
    pub cause: DiagnosticCause,
}

#[derive(Debug, Clone, Error)]
pub enum DiagnosticCause {
    /// The fetch for this leaf's key failed.
    #[error(transparent)]
    Fetch(FetchError),

    /// The leaf sits behind a read-only field.
    #[error("field is not settable")]
    Unsettable,

    /// No outcome was recorded for this key. Indicates the graph changed
    /// between the collect and replace passes.
    #[error("no resolution outcome recorded for this key")]
    MissingOutcome,

    /// The containing map refused the entry on write-back.
    #[error("map entry was rejected on write-back")]
    EntryRejected,
}

/// Joined collection of every per-leaf failure from one hydrate call.
#[derive(Debug)]
pub struct AggregateError {
    failures: Vec<Diagnostic>,
}

impl AggregateError {
    pub(crate) fn new(failures: Vec<Diagnostic>) -> Self {
        Self { failures }
    }

    /// The individual `(path, key, cause)` diagnostics, in walk order.
    pub fn failures(&self) -> &[Diagnostic] {
        &self.failures
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to hydrate {} field(s)", self.failures.len())?;
        for (index, failure) in self.failures.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
