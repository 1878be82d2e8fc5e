use crate::errors::FlagError;
use crate::flags::{FlagContainer, FlagDefinition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub mod local;
pub mod remote;

/// Outcome of a configuration fetch reported by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherStatus {
    /// New configuration was downloaded and applied.
    AppliedFromNetwork,
    /// The remote configuration didn't change since the last fetch.
    NotModified,
    /// Configuration was pushed by an in-process source.
    AppliedFromLocal,
    /// The fetch failed; previously applied values are kept.
    ErrorFetchFailed,
}

/// Details passed to the [`SetupOptions`] change handler.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherResults {
    /// True when at least one flag value differs from the previously applied ones.
    pub has_changes: bool,
    /// Outcome of the fetch.
    pub status: FetcherStatus,
    /// Time the fetch completed.
    pub fetch_time: DateTime<Utc>,
}

impl FetcherResults {
    pub(crate) fn new(has_changes: bool, status: FetcherStatus) -> Self {
        Self {
            has_changes,
            status,
            fetch_time: Utc::now(),
        }
    }
}

/// Handler an adapter invokes every time it finished fetching configuration.
pub type FetchedHandler = Arc<dyn Fn(FetcherResults) + Send + Sync>;

/// Options passed to [`FlagAdapter::setup`].
#[derive(Clone, Default)]
pub struct SetupOptions {
    /// Invoked after each fetch, possibly from a background task, zero or many times.
    pub on_fetched: Option<FetchedHandler>,
    /// Secret that unlocks developer tooling of the flag service.
    pub dev_mode_secret: Option<String>,
}

impl SetupOptions {
    pub(crate) fn fetched(&self, results: FetcherResults) {
        if let Some(handler) = &self.on_fetched {
            handler(results);
        }
    }
}

impl Debug for SetupOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupOptions")
            .field("on_fetched", &self.on_fetched.is_some())
            .field("dev_mode_secret", &self.dev_mode_secret.is_some())
            .finish()
    }
}

/// Client of a flag-management service.
///
/// Implementations must answer [`FlagAdapter::is_enabled`] with the
/// definition's default until remote values are known.
#[async_trait]
pub trait FlagAdapter: Send + Sync {
    /// Registers `container` under `namespace`. Must precede [`FlagAdapter::setup`].
    fn register(&self, namespace: &str, container: &FlagContainer);

    /// Connects to the service with `key`. An empty `key` makes the adapter serve defaults.
    async fn setup(&self, key: &str, options: SetupOptions) -> Result<(), FlagError>;

    /// Current value of the flag described by `flag`.
    fn is_enabled(&self, flag: &FlagDefinition) -> bool;

    /// Stops background work started by [`FlagAdapter::setup`].
    fn shutdown(&self) {}
}
