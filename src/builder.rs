use crate::adapter::FlagAdapter;
use crate::constants::{BUILD_TIME_API_KEY, RUNTIME_CONFIG_PATH};
use crate::errors::{ErrorKind, FlagError};
use crate::key::KeyResolver;
use crate::FeatureFlags;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct Options {
    pub(crate) adapter: Arc<dyn FlagAdapter>,
    pub(crate) resolver: KeyResolver,
}

/// Builder to create [`FeatureFlags`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use insurance_flags::{FeatureFlags, LocalAdapter};
///
/// let flags = FeatureFlags::builder(Arc::new(LocalAdapter::new()))
///     .base_url("https://portal.example.com/app/")
///     .http_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// ```
pub struct FeatureFlagsBuilder {
    adapter: Arc<dyn FlagAdapter>,
    base_url: Option<String>,
    runtime_config_path: Option<String>,
    build_time_key: Option<String>,
    http_timeout: Option<Duration>,
}

impl FeatureFlagsBuilder {
    pub(crate) fn new(adapter: Arc<dyn FlagAdapter>) -> Self {
        Self {
            adapter,
            base_url: None,
            runtime_config_path: None,
            build_time_key: BUILD_TIME_API_KEY.map(str::to_owned),
            http_timeout: None,
        }
    }

    /// Sets the URL the runtime configuration document is resolved against.
    /// Without it, the runtime configuration lookup is skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use insurance_flags::{FeatureFlags, LocalAdapter};
    ///
    /// let builder = FeatureFlags::builder(Arc::new(LocalAdapter::new()))
    ///     .base_url("https://portal.example.com/");
    /// ```
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_owned());
        self
    }

    /// Sets the path of the runtime configuration document relative to the base URL.
    /// Default value is `config/fm.json`.
    pub fn runtime_config_path(mut self, path: &str) -> Self {
        self.runtime_config_path = Some(path.to_owned());
        self
    }

    /// Replaces the key injected through `INSURANCE_FM_API_KEY` at build time.
    pub fn build_time_key(mut self, key: Option<&str>) -> Self {
        self.build_time_key = key.map(str::to_owned);
        self
    }

    /// Sets the timeout of the runtime configuration request.
    /// Default value is `30` seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Creates [`FeatureFlags`] from the configuration made on the builder.
    ///
    /// # Errors
    ///
    /// This method fails if the base URL is invalid or the HTTP client can't be initialized.
    pub fn build(self) -> Result<FeatureFlags, FlagError> {
        let runtime_config_url = match &self.base_url {
            Some(base_url) => Some(self.runtime_config_url(base_url)?),
            None => None,
        };
        let http_client = reqwest::Client::builder()
            .timeout(self.http_timeout.unwrap_or(Duration::from_secs(30)))
            .build()
            .map_err(|err| {
                FlagError::new(
                    ErrorKind::HttpClientInitFailure,
                    format!("Failed to initialize the HTTP client. {err}"),
                )
            })?;
        Ok(FeatureFlags::with_options(Options {
            adapter: self.adapter,
            resolver: KeyResolver::new(self.build_time_key, runtime_config_url, http_client),
        }))
    }

    fn runtime_config_url(&self, base_url: &str) -> Result<Url, FlagError> {
        let path = self
            .runtime_config_path
            .as_deref()
            .unwrap_or(RUNTIME_CONFIG_PATH);
        Url::parse(base_url)
            .and_then(|base| base.join(path))
            .map_err(|err| {
                FlagError::new(
                    ErrorKind::InvalidBaseUrl,
                    format!("Base URL '{base_url}' is invalid. {err}"),
                )
            })
    }
}

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::adapter::local::LocalAdapter;

    fn builder() -> FeatureFlagsBuilder {
        FeatureFlagsBuilder::new(Arc::new(LocalAdapter::new()))
    }

    #[test]
    fn runtime_config_url_is_relative() {
        let b = builder();
        assert_eq!(
            b.runtime_config_url("https://portal.example.com/app/").unwrap().as_str(),
            "https://portal.example.com/app/config/fm.json"
        );
        assert_eq!(
            b.runtime_config_url("http://127.0.0.1:8080").unwrap().as_str(),
            "http://127.0.0.1:8080/config/fm.json"
        );

        let b = builder().runtime_config_path("settings/flags.json");
        assert_eq!(
            b.runtime_config_url("https://portal.example.com/").unwrap().as_str(),
            "https://portal.example.com/settings/flags.json"
        );
    }

    #[test]
    fn invalid_base_url() {
        let err = builder().base_url("not a url").build().err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidBaseUrl);
    }
}
