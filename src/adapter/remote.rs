use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use log::{info, warn};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::adapter::{FetcherResults, FetcherStatus, FlagAdapter, SetupOptions};
use crate::errors::{ErrorKind, FlagError};
use crate::fetch::fetcher::{FetchResponse, Fetcher};
use crate::flags::{FlagContainer, FlagDefinition};
use crate::modes::PollingMode;

struct AdapterState {
    fetcher: Fetcher,
    namespace: ArcSwap<String>,
    api_key: ArcSwap<String>,
    values: ArcSwap<HashMap<String, bool>>,
    etag: tokio::sync::Mutex<String>,
    options: Mutex<SetupOptions>,
}

impl AdapterState {
    fn options(&self) -> SetupOptions {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Adapter that downloads flag values from a flag-management service over HTTP.
///
/// Remote values are keyed as `<namespace>.<flag name>`; flags without a remote
/// value report their default.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use insurance_flags::{FeatureFlags, InitConfig, PollingMode, RemoteAdapter};
///
/// #[tokio::main]
/// async fn main() {
///     let adapter = RemoteAdapter::builder("https://flags.example.com")
///         .polling_mode(PollingMode::AutoPoll(Duration::from_secs(30)))
///         .build()
///         .unwrap();
///
///     let flags = FeatureFlags::new(Arc::new(adapter)).unwrap();
///     flags.initialize(InitConfig::default()).await;
/// }
/// ```
pub struct RemoteAdapter {
    state: Arc<AdapterState>,
    polling_mode: PollingMode,
    cancellation_token: CancellationToken,
    close: Once,
}

impl RemoteAdapter {
    /// Creates a new [`RemoteAdapterBuilder`] for the flag service at `base_url`.
    pub fn builder(base_url: &str) -> RemoteAdapterBuilder {
        RemoteAdapterBuilder::new(base_url)
    }

    /// Fetches the latest flag configuration.
    ///
    /// # Errors
    ///
    /// This method fails when no API key was passed to setup, or the HTTP request fails.
    pub async fn refresh(&self) -> Result<(), FlagError> {
        if self.state.api_key.load().is_empty() {
            let err = FlagError::new(
                ErrorKind::MissingApiKey,
                "Adapter has no API key, it cannot initiate HTTP calls.".to_owned(),
            );
            warn!(event_id = err.kind.as_u16(); "{}", err);
            return Err(err);
        }
        fetch_and_apply(&self.state).await.map_err(|(err, _)| err)
    }

    fn start_poll(&self, interval: Duration) {
        let state = Arc::clone(&self.state);
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            let mut int = interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = int.tick() => {
                        _ = fetch_and_apply(&state).await;
                    },
                    _ = token.cancelled() => break
                }
            }
        });
    }

    fn close(&self) {
        self.close.call_once(|| self.cancellation_token.cancel());
    }
}

#[async_trait]
impl FlagAdapter for RemoteAdapter {
    fn register(&self, namespace: &str, _: &FlagContainer) {
        self.state.namespace.store(Arc::new(namespace.to_owned()));
    }

    async fn setup(&self, key: &str, options: SetupOptions) -> Result<(), FlagError> {
        *self
            .state
            .options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = options;
        if key.is_empty() {
            info!("No API key passed to setup, serving default flag values");
            return Ok(());
        }
        self.state.api_key.store(Arc::new(key.to_owned()));

        let result = fetch_and_apply(&self.state).await;
        let keep_polling = match &result {
            Ok(()) => true,
            Err((_, transient)) => *transient,
        };
        if let PollingMode::AutoPoll(interval) = self.polling_mode {
            if keep_polling {
                self.start_poll(interval);
            }
        }
        result.map_err(|(err, _)| {
            FlagError::new(
                ErrorKind::AdapterSetupFailure,
                format!("Initial flag configuration fetch failed. {err}"),
            )
        })
    }

    fn is_enabled(&self, flag: &FlagDefinition) -> bool {
        let key = format!("{}.{}", self.state.namespace.load().as_str(), flag.name());
        self.state
            .values
            .load()
            .get(&key)
            .copied()
            .unwrap_or(flag.default_value())
    }

    fn shutdown(&self) {
        self.close();
    }
}

impl Drop for RemoteAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

async fn fetch_and_apply(state: &Arc<AdapterState>) -> Result<(), (FlagError, bool)> {
    let options = state.options();
    let namespace = state.namespace.load_full();
    let api_key = state.api_key.load_full();
    let outcome = {
        let mut etag = state.etag.lock().await;
        let response = state
            .fetcher
            .fetch(
                namespace.as_str(),
                api_key.as_str(),
                options.dev_mode_secret.as_deref(),
                etag.as_str(),
            )
            .await;
        match response {
            FetchResponse::Fetched(values, new_etag) => {
                let has_changes = *state.values.load_full() != values;
                state.values.store(Arc::new(values));
                *etag = new_etag;
                Ok(FetcherResults::new(has_changes, FetcherStatus::AppliedFromNetwork))
            }
            FetchResponse::NotModified => {
                Ok(FetcherResults::new(false, FetcherStatus::NotModified))
            }
            FetchResponse::Failed(err, transient) => Err((err, transient)),
        }
    };

    match outcome {
        Ok(results) => {
            options.fetched(results);
            Ok(())
        }
        Err(failure) => {
            options.fetched(FetcherResults::new(false, FetcherStatus::ErrorFetchFailed));
            Err(failure)
        }
    }
}

/// Builder to create a [`RemoteAdapter`].
pub struct RemoteAdapterBuilder {
    base_url: String,
    http_timeout: Option<Duration>,
    polling_mode: Option<PollingMode>,
}

impl RemoteAdapterBuilder {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            http_timeout: None,
            polling_mode: None,
        }
    }

    /// Sets the HTTP request timeout.
    /// Default value is `30` seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the [`PollingMode`] of the adapter.
    /// Default value is [`PollingMode::AutoPoll`] with `60` seconds poll interval.
    pub fn polling_mode(mut self, polling_mode: PollingMode) -> Self {
        self.polling_mode = Some(polling_mode);
        self
    }

    /// Creates a [`RemoteAdapter`] from the configuration made on the builder.
    ///
    /// # Errors
    ///
    /// This method fails if the internal HTTP client can't be initialized.
    pub fn build(self) -> Result<RemoteAdapter, FlagError> {
        let fetcher = Fetcher::new(
            self.base_url.as_str(),
            self.http_timeout.unwrap_or(Duration::from_secs(30)),
        )?;
        Ok(RemoteAdapter {
            state: Arc::new(AdapterState {
                fetcher,
                namespace: ArcSwap::from_pointee(String::default()),
                api_key: ArcSwap::from_pointee(String::default()),
                values: ArcSwap::from_pointee(HashMap::new()),
                etag: tokio::sync::Mutex::new(String::default()),
                options: Mutex::new(SetupOptions::default()),
            }),
            polling_mode: self
                .polling_mode
                .unwrap_or(PollingMode::AutoPoll(Duration::from_secs(60))),
            cancellation_token: CancellationToken::new(),
            close: Once::new(),
        })
    }
}
