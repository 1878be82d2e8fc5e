/// Version of this crate, sent in the user agent header.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace the flags are registered under with the flag service.
pub const NAMESPACE: &str = "insurancestack";
/// Path of the runtime configuration document, relative to the base URL.
pub const RUNTIME_CONFIG_PATH: &str = "config/fm.json";
/// API key injected at build time through `INSURANCE_FM_API_KEY`.
pub const BUILD_TIME_API_KEY: Option<&str> = option_env!("INSURANCE_FM_API_KEY");
