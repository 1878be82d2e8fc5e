//! Feature flag runtime of the InsuranceStack customer portal.
//!
//! [`FeatureFlags`] registers the portal's flags with a flag-management
//! adapter, resolves the adapter's API key, keeps a [`Snapshot`] of every flag
//! and notifies subscribed listeners whenever the snapshot is rebuilt. The
//! [`portal`] module holds the claim and payment records the portal renders.

#![warn(missing_docs)]

mod adapter;
mod builder;
mod client;
mod constants;
mod errors;
mod fetch;
mod flags;
mod key;
mod modes;
pub mod portal;
mod snapshot;
mod subscription;
mod values;

pub use adapter::local::LocalAdapter;
pub use adapter::remote::{RemoteAdapter, RemoteAdapterBuilder};
pub use adapter::{FetchedHandler, FetcherResults, FetcherStatus, FlagAdapter, SetupOptions};
pub use builder::FeatureFlagsBuilder;
pub use client::{FeatureFlags, InitConfig};
pub use constants::{NAMESPACE, PKG_VERSION, RUNTIME_CONFIG_PATH};
pub use errors::{ErrorKind, FlagError};
pub use flags::{Flag, FlagContainer, FlagDefinition};
pub use key::{KeySource, ResolvedKey};
pub use modes::PollingMode;
pub use snapshot::{Reason, Snapshot};
pub use subscription::{Listener, Subscription};
pub use values::FlagValues;
