use crate::adapter::{FetchedHandler, FetcherResults, FlagAdapter, SetupOptions};
use crate::builder::{FeatureFlagsBuilder, Options};
use crate::constants::NAMESPACE;
use crate::errors::{ErrorKind, FlagError};
use crate::flags::{Flag, FlagContainer};
use crate::key::KeyResolver;
use crate::snapshot::{Reason, Snapshot, SnapshotStore};
use crate::subscription::{panic_message, Listener, Subscription, SubscriptionRegistry};
use crate::values::FlagValues;
use futures::FutureExt;
use log::{error, info, warn};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Once};

/// Application configuration passed to [`FeatureFlags::initialize`].
#[derive(Debug, Clone, Default)]
pub struct InitConfig {
    /// API key of the flag service. Takes precedence over every other key source.
    pub api_key: Option<String>,
    /// Secret that unlocks developer tooling of the flag service.
    pub dev_mode_secret: Option<String>,
}

struct Shared {
    adapter: Arc<dyn FlagAdapter>,
    container: FlagContainer,
    store: SnapshotStore,
    registry: SubscriptionRegistry,
}

impl Shared {
    fn rebuild(&self, reason: Reason) -> Arc<Snapshot> {
        self.store
            .rebuild(reason, self.adapter.as_ref(), &self.container, &self.registry)
    }
}

/// The feature flag runtime of the InsuranceStack UI.
///
/// Owns the flag container, the latest [`Snapshot`] and the subscribed
/// listeners. Flag reads never wait for initialization: until the adapter has
/// remote values, every flag reports its default.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use insurance_flags::{FeatureFlags, InitConfig, LocalAdapter, Reason, Snapshot};
///
/// #[tokio::main]
/// async fn main() {
///     let flags = FeatureFlags::builder(Arc::new(LocalAdapter::new()))
///         .base_url("https://portal.example.com/")
///         .build()
///         .unwrap();
///
///     let subscription = flags.subscribe(Arc::new(|reason: &Reason, snapshot: &Snapshot| {
///         println!("{reason}: {:?}", snapshot.values());
///     }));
///
///     flags.initialize(InitConfig::default()).await;
///
///     if flags.is_claims_filters_enabled() {
///         // render claim filters
///     }
///     subscription.unsubscribe();
/// }
/// ```
pub struct FeatureFlags {
    shared: Arc<Shared>,
    resolver: KeyResolver,
    close: Once,
}

impl FeatureFlags {
    pub(crate) fn with_options(options: Options) -> Self {
        Self {
            shared: Arc::new(Shared {
                adapter: options.adapter,
                container: FlagContainer::insurance(),
                store: SnapshotStore::new(),
                registry: SubscriptionRegistry::new(),
            }),
            resolver: options.resolver,
            close: Once::new(),
        }
    }

    /// Creates a new [`FeatureFlagsBuilder`] used to build [`FeatureFlags`] on top of `adapter`.
    pub fn builder(adapter: Arc<dyn FlagAdapter>) -> FeatureFlagsBuilder {
        FeatureFlagsBuilder::new(adapter)
    }

    /// Creates [`FeatureFlags`] with default options.
    ///
    /// # Errors
    ///
    /// This method fails if the internal HTTP client can't be initialized.
    pub fn new(adapter: Arc<dyn FlagAdapter>) -> Result<Self, FlagError> {
        Self::builder(adapter).build()
    }

    /// Registers the flags with the adapter, resolves the API key and sets the adapter up.
    ///
    /// Never fails: when setup returns an error or panics, the failure is logged
    /// and the snapshot is rebuilt with [`Reason::Error`], leaving the flags on
    /// whatever the adapter reports (the defaults when it has no remote values). On success
    /// the snapshot is rebuilt with [`Reason::Initialized`]; fetches reported by
    /// the adapter later rebuild it with [`Reason::Fetched`].
    ///
    /// Call it once; a second call registers and sets the adapter up again.
    pub async fn initialize(&self, config: InitConfig) {
        self.shared.adapter.register(NAMESPACE, &self.shared.container);

        let resolved = self.resolver.resolve(config.api_key.as_deref()).await;
        let options = SetupOptions {
            on_fetched: Some(self.fetched_handler()),
            dev_mode_secret: config.dev_mode_secret,
        };

        if !resolved.is_present() {
            warn!(event_id = ErrorKind::MissingApiKey.as_u16(); "No API key provided, using default flag values. Set INSURANCE_FM_API_KEY or deploy a runtime config to connect to the flag service.");
        }
        let setup = AssertUnwindSafe(self.shared.adapter.setup(resolved.key(), options))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(FlagError::new(
                    ErrorKind::AdapterSetupFailure,
                    format!("Adapter setup panicked: {}", panic_message(payload.as_ref())),
                ))
            });
        if setup.is_ok() && resolved.is_present() {
            info!("Feature flags initialized successfully");
        }

        match setup {
            Ok(()) => {
                self.shared.rebuild(Reason::Initialized);
            }
            Err(err) => {
                error!(event_id = err.kind.as_u16(); "Failed to initialize feature flags: {err}");
                self.shared.rebuild(Reason::Error);
            }
        }
    }

    /// Returns the latest [`Snapshot`]; empty if it was never built.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.store.current()
    }

    /// Rebuilds the snapshot from the adapter's current values and notifies every listener.
    ///
    /// Must not be called from a listener.
    pub fn set_snapshot(&self, reason: impl Into<Reason>) -> Arc<Snapshot> {
        self.shared.rebuild(reason.into())
    }

    /// Subscribes `listener` to snapshot rebuilds.
    ///
    /// Listeners run while the rebuild lock is held and must not call
    /// [`FeatureFlags::set_snapshot`].
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        self.shared.registry.subscribe(listener)
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Live value of `flag` as reported by the adapter.
    pub fn is_enabled(&self, flag: Flag) -> bool {
        match self.shared.container.get(flag.name()) {
            Some(def) => self.shared.adapter.is_enabled(def),
            None => flag.default_value(),
        }
    }

    /// True when the top alerts banner should be shown.
    pub fn is_alerts_banner_enabled(&self) -> bool {
        self.is_enabled(Flag::AlertsBanner)
    }

    /// True when the claims list offers advanced filtering.
    pub fn is_claims_filters_enabled(&self) -> bool {
        self.is_enabled(Flag::ClaimsFilters)
    }

    /// True when the payments list offers advanced filtering.
    pub fn is_payments_filters_enabled(&self) -> bool {
        self.is_enabled(Flag::PaymentsFilters)
    }

    /// True when the enhanced policy detail view is available.
    pub fn is_enhanced_policy_view_enabled(&self) -> bool {
        self.is_enabled(Flag::EnhancedPolicyView)
    }

    /// True when the streamlined claim filing process is available.
    pub fn is_quick_claim_filing_enabled(&self) -> bool {
        self.is_enabled(Flag::QuickClaimFiling)
    }

    /// Live values of every flag.
    pub fn values(&self) -> FlagValues {
        FlagValues::from_fn(|flag| self.is_enabled(flag))
    }

    /// Shuts the adapter down and removes every listener.
    pub fn close(&self) {
        self.close.call_once(|| {
            self.shared.adapter.shutdown();
            self.shared.registry.clear();
        });
    }

    fn fetched_handler(&self) -> FetchedHandler {
        let shared = Arc::downgrade(&self.shared);
        Arc::new(move |results: FetcherResults| {
            info!(
                "Configuration fetched: has_changes={}, status={:?}",
                results.has_changes, results.status
            );
            if let Some(shared) = shared.upgrade() {
                shared.rebuild(Reason::Fetched);
            }
        })
    }
}

impl Drop for FeatureFlags {
    fn drop(&mut self) {
        self.close();
    }
}
