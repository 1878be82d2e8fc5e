use crate::adapter::{FetcherResults, FetcherStatus, FlagAdapter, SetupOptions};
use crate::errors::FlagError;
use crate::flags::{FlagContainer, FlagDefinition};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Adapter that serves flag values held in memory.
///
/// Useful for development, offline runs and tests: [`LocalAdapter::set`] changes
/// a value and [`LocalAdapter::push`] reports it to the runtime the way a remote
/// push would.
///
/// # Examples
///
/// ```rust
/// use insurance_flags::{Flag, LocalAdapter};
///
/// let adapter = LocalAdapter::from([("enhancedPolicyView", true)]);
/// adapter.set(Flag::AlertsBanner.name(), false);
/// ```
pub struct LocalAdapter {
    values: ArcSwap<HashMap<String, bool>>,
    options: Mutex<Option<SetupOptions>>,
}

impl LocalAdapter {
    /// Creates an adapter without values; every flag reports its default.
    pub fn new() -> Self {
        Self {
            values: ArcSwap::from_pointee(HashMap::new()),
            options: Mutex::new(None),
        }
    }

    /// Sets the value of the flag identified by `name`.
    pub fn set(&self, name: &str, value: bool) {
        self.values.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(name.to_owned(), value);
            next
        });
    }

    /// Removes the value of `name`, so it reports its default again.
    pub fn unset(&self, name: &str) {
        self.values.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(name);
            next
        });
    }

    /// Invokes the change handler passed to [`FlagAdapter::setup`].
    ///
    /// Returns `false` when setup hasn't happened yet.
    pub fn push(&self) -> bool {
        let options = self
            .options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match options {
            Some(opts) => {
                opts.fetched(FetcherResults::new(true, FetcherStatus::AppliedFromLocal));
                true
            }
            None => false,
        }
    }
}

impl Default for LocalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> From<[(&str, bool); N]> for LocalAdapter {
    fn from(arr: [(&str, bool); N]) -> Self {
        let adapter = Self::new();
        adapter.values.store(Arc::new(
            arr.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ));
        adapter
    }
}

#[async_trait]
impl FlagAdapter for LocalAdapter {
    fn register(&self, _: &str, _: &FlagContainer) {}

    async fn setup(&self, _: &str, options: SetupOptions) -> Result<(), FlagError> {
        *self.options.lock().unwrap_or_else(PoisonError::into_inner) = Some(options);
        Ok(())
    }

    fn is_enabled(&self, flag: &FlagDefinition) -> bool {
        self.values
            .load()
            .get(flag.name())
            .copied()
            .unwrap_or(flag.default_value())
    }
}
