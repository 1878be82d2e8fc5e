use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error kind that represents failures reported by the flag runtime and its adapters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ErrorKind {
    /// No error occurred.
    NoError,
    /// Initialization of the internal [`reqwest::Client`] failed.
    HttpClientInitFailure,
    /// The runtime configuration document could not be downloaded.
    RuntimeConfigUnavailable = 1000,
    /// The runtime configuration document was downloaded but its content was invalid.
    InvalidRuntimeConfig = 1001,
    /// No access key was found in any of the configured sources.
    MissingApiKey = 1002,
    /// An HTTP response indicating an invalid access key was received (401, 403 or 404).
    InvalidApiKey = 1100,
    /// Invalid HTTP response was received (unexpected HTTP status code).
    UnexpectedHttpResponse = 1101,
    /// The HTTP request timed out.
    HttpRequestTimeout = 1102,
    /// The HTTP request failed (most likely, due to a local network issue).
    HttpRequestFailure = 1103,
    /// An invalid HTTP response was received (200 OK with an invalid content).
    InvalidHttpResponseContent = 1105,
    /// The adapter failed to complete its setup.
    AdapterSetupFailure = 2000,
    /// A subscribed listener panicked while being notified.
    ListenerFailure = 2100,
    /// A duplicate flag name was added to a container.
    DuplicateFlag = 3000,
    /// The configured base URL couldn't be parsed.
    InvalidBaseUrl = 3001,
}

impl ErrorKind {
    pub(crate) fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Error struct that holds the [`ErrorKind`] and message of the reported failure.
#[derive(Debug, PartialEq)]
pub struct FlagError {
    /// Error kind that represents the failure.
    pub kind: ErrorKind,
    /// The text representation of the failure.
    pub message: String,
}

impl FlagError {
    /// Creates a new [`FlagError`].
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { message, kind }
    }
}

impl Display for FlagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl Error for FlagError {}
