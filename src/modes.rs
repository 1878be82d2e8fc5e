use std::time::Duration;

/// Describes how a [`crate::RemoteAdapter`] keeps its flag values up to date.
pub enum PollingMode {
    /// Re-fetches the flag configuration with the given interval in a background task.
    AutoPoll(Duration),
    /// Fetches only during setup and on [`crate::RemoteAdapter::refresh`].
    Manual,
}
