use crate::adapter::FlagAdapter;
use crate::flags::FlagContainer;
use crate::subscription::SubscriptionRegistry;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

/// Describes why a [`Snapshot`] was (re)built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The adapter reported freshly fetched configuration.
    Fetched,
    /// The adapter setup has completed.
    Initialized,
    /// The adapter setup failed; the snapshot holds whatever the adapter reports, usually the defaults.
    Error,
    /// A rebuild requested by the application.
    Custom(String),
}

impl Reason {
    /// The short tag of the reason.
    pub fn as_str(&self) -> &str {
        match self {
            Reason::Fetched => "fetched",
            Reason::Initialized => "initialized",
            Reason::Error => "error",
            Reason::Custom(tag) => tag.as_str(),
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Reason {
    fn from(value: &str) -> Self {
        match value {
            "fetched" => Reason::Fetched,
            "initialized" => Reason::Initialized,
            "error" => Reason::Error,
            tag => Reason::Custom(tag.to_owned()),
        }
    }
}

impl From<String> for Reason {
    fn from(value: String) -> Self {
        Reason::from(value.as_str())
    }
}

/// Immutable point-in-time mapping of every declared flag to its value.
///
/// Snapshots are never modified; a rebuild produces a new one, so a held
/// snapshot stays a valid view of the moment it was taken.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    values: HashMap<String, bool>,
    reason: Option<Reason>,
    built_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub(crate) fn new(values: HashMap<String, bool>, reason: Reason) -> Self {
        Self {
            values,
            reason: Some(reason),
            built_at: Some(Utc::now()),
        }
    }

    /// Value of the flag identified by `name`, if it's part of the snapshot.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// All flag values of the snapshot.
    pub fn values(&self) -> &HashMap<String, bool> {
        &self.values
    }

    /// The reason of the rebuild that produced this snapshot; [`None`] if it was never built.
    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// Time of the rebuild that produced this snapshot.
    pub fn built_at(&self) -> Option<&DateTime<Utc>> {
        self.built_at.as_ref()
    }

    /// Number of flags in the snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the snapshot was never built.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Holds the latest [`Snapshot`] and serializes rebuilds.
pub(crate) struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    rebuild_lock: Mutex<()>,
}

impl SnapshotStore {
    pub(crate) fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
            rebuild_lock: Mutex::new(()),
        }
    }

    pub(crate) fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Reads every flag of `container` through `adapter`, swaps the stored
    /// snapshot and notifies `registry`. Concurrent rebuilds run one after another.
    pub(crate) fn rebuild(
        &self,
        reason: Reason,
        adapter: &dyn FlagAdapter,
        container: &FlagContainer,
        registry: &SubscriptionRegistry,
    ) -> Arc<Snapshot> {
        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let values = container
            .iter()
            .map(|def| (def.name().to_owned(), adapter.is_enabled(def)))
            .collect::<HashMap<String, bool>>();
        let snapshot = Arc::new(Snapshot::new(values, reason.clone()));
        self.current.store(Arc::clone(&snapshot));
        debug!("Snapshot updated: {reason} {:?}", snapshot.values());

        registry.notify(&reason, &snapshot);
        snapshot
    }
}
