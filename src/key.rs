use crate::errors::ErrorKind::*;
use crate::errors::FlagError;
use crate::fetch::payload::{runtime_config_from_json, RuntimeConfig};
use log::{debug, info, warn};
use reqwest::Url;
use std::fmt::{Display, Formatter};

/// Where an API key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Passed to `initialize` by the application.
    Explicit,
    /// Injected at build time through `INSURANCE_FM_API_KEY`.
    BuildTime,
    /// Read from the runtime configuration document.
    RuntimeConfig,
}

impl KeySource {
    const ORDER: [KeySource; 3] = [
        KeySource::Explicit,
        KeySource::BuildTime,
        KeySource::RuntimeConfig,
    ];
}

impl Display for KeySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Explicit => f.write_str("explicit config"),
            KeySource::BuildTime => f.write_str("build-time environment"),
            KeySource::RuntimeConfig => f.write_str("runtime config"),
        }
    }
}

/// Result of the key resolution. An absent key is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedKey {
    key: String,
    source: Option<KeySource>,
}

impl ResolvedKey {
    /// The resolved key; empty when no source provided one.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The source the key came from.
    pub fn source(&self) -> Option<KeySource> {
        self.source
    }

    /// True when a key was found.
    pub fn is_present(&self) -> bool {
        !self.key.is_empty()
    }
}

/// Resolves the API key from the explicit argument, the build-time constant,
/// then the runtime configuration document, stopping at the first non-empty one.
pub(crate) struct KeyResolver {
    build_time_key: Option<String>,
    runtime_config_url: Option<Url>,
    http_client: reqwest::Client,
}

impl KeyResolver {
    pub(crate) fn new(
        build_time_key: Option<String>,
        runtime_config_url: Option<Url>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            build_time_key,
            runtime_config_url,
            http_client,
        }
    }

    pub(crate) async fn resolve(&self, explicit: Option<&str>) -> ResolvedKey {
        for source in KeySource::ORDER {
            let candidate = match source {
                KeySource::Explicit => explicit.map(str::to_owned),
                KeySource::BuildTime => self.build_time_key.clone(),
                KeySource::RuntimeConfig => self.runtime_key().await,
            };
            if let Some(key) = candidate.filter(|k| !k.is_empty()) {
                info!("Loaded API key from {source}");
                return ResolvedKey {
                    key,
                    source: Some(source),
                };
            }
        }
        ResolvedKey::default()
    }

    async fn runtime_key(&self) -> Option<String> {
        let Some(url) = &self.runtime_config_url else {
            debug!("No base URL configured, skipping runtime config lookup");
            return None;
        };
        match self.fetch_runtime_config(url).await {
            Ok(config) => config.env_key,
            Err(err) => {
                warn!(event_id = err.kind.as_u16(); "No runtime config found, using defaults. {err}");
                None
            }
        }
    }

    async fn fetch_runtime_config(&self, url: &Url) -> Result<RuntimeConfig, FlagError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| {
                FlagError::new(
                    RuntimeConfigUnavailable,
                    format!("Failed to fetch runtime config from '{url}'. {err}"),
                )
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FlagError::new(
                RuntimeConfigUnavailable,
                format!(
                    "Runtime config request to '{url}' returned status code {}",
                    status.as_u16()
                ),
            ));
        }
        let body = response.text().await.map_err(|err| {
            FlagError::new(
                InvalidRuntimeConfig,
                format!("Failed to read runtime config body. {err}"),
            )
        })?;
        runtime_config_from_json(body.as_str()).map_err(|err| {
            FlagError::new(
                InvalidRuntimeConfig,
                format!("Runtime config content was invalid. {err}"),
            )
        })
    }
}
