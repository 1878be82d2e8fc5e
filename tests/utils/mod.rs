#![allow(dead_code)]

use async_trait::async_trait;
use insurance_flags::{
    ErrorKind, FeatureFlags, FlagAdapter, FlagContainer, FlagDefinition, FlagError, LocalAdapter,
    Reason, SetupOptions, Snapshot,
};
use log::kv::Key;
use log::{set_max_level, Level, Log, Metadata, Record};
use rand::distr::{Alphanumeric, SampleString};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const RUNTIME_CONFIG_PATH: &str = "/config/fm.json";
pub const FLAGS_PATH: &str = "/flags/insurancestack";
pub const API_KEY_HEADER: &str = "X-FM-Api-Key";

pub fn rand_api_key() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 32)
}

pub fn runtime_config_payload(key: &str) -> String {
    format!(r#"{{"envKey": "{key}"}}"#)
}

pub fn flags_payload(values: &[(&str, bool)]) -> String {
    let flags = values
        .iter()
        .map(|(name, value)| format!(r#""insurancestack.{name}": {value}"#))
        .collect::<Vec<String>>()
        .join(", ");
    format!(r#"{{"flags": {{{flags}}}}}"#)
}

pub fn defaults() -> HashMap<String, bool> {
    HashMap::from([
        ("alertsBanner".to_owned(), true),
        ("claimsFilters".to_owned(), true),
        ("paymentsFilters".to_owned(), true),
        ("enhancedPolicyView".to_owned(), false),
        ("quickClaimFiling".to_owned(), true),
    ])
}

/// Collects every notification a listener receives.
#[derive(Clone, Default)]
pub struct Notifications {
    received: Arc<Mutex<Vec<(Reason, Arc<Snapshot>)>>>,
}

impl Notifications {
    pub fn subscribe(&self, flags: &FeatureFlags) -> insurance_flags::Subscription {
        let received = Arc::clone(&self.received);
        flags.subscribe(Arc::new(move |reason: &Reason, snapshot: &Snapshot| {
            received
                .lock()
                .unwrap()
                .push((reason.clone(), Arc::new(snapshot.clone())));
        }))
    }

    pub fn reasons(&self) -> Vec<Reason> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(reason, _)| reason.clone())
            .collect()
    }

    pub fn last(&self) -> Option<(Reason, Arc<Snapshot>)> {
        self.received.lock().unwrap().last().cloned()
    }
}

/// Wraps a [`LocalAdapter`] and records the calls the runtime makes.
pub struct RecordingAdapter {
    pub inner: LocalAdapter,
    calls: Mutex<Vec<String>>,
    fail_setup: bool,
    panic_setup: bool,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self {
            inner: LocalAdapter::new(),
            calls: Mutex::new(Vec::new()),
            fail_setup: false,
            panic_setup: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_setup: true,
            ..Self::new()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic_setup: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlagAdapter for RecordingAdapter {
    fn register(&self, namespace: &str, container: &FlagContainer) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("register:{namespace}:{}", container.len()));
    }

    async fn setup(&self, key: &str, options: SetupOptions) -> Result<(), FlagError> {
        self.calls.lock().unwrap().push(format!("setup:{key}"));
        if self.panic_setup {
            panic!("adapter exploded");
        }
        if self.fail_setup {
            return Err(FlagError::new(
                ErrorKind::AdapterSetupFailure,
                "simulated setup failure".to_owned(),
            ));
        }
        self.inner.setup(key, options).await
    }

    fn is_enabled(&self, flag: &FlagDefinition) -> bool {
        self.inner.is_enabled(flag)
    }
}

pub struct RecordingLogger {}

impl RecordingLogger {
    thread_local!(pub static LOGS: RefCell<String> = RefCell::new(String::default()));

    pub fn take() -> String {
        Self::LOGS.with_borrow_mut(std::mem::take)
    }
}

impl Log for RecordingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().contains("insurance_flags")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let event_id = record
            .key_values()
            .get(Key::from("event_id"))
            .and_then(|id| id.to_i64())
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_owned());
        Self::LOGS.with_borrow_mut(|l| l.push_str(format!("{level} [{event_id}] {}\n", record.args()).as_str()));
    }

    fn flush(&self) {}
}

pub fn log_record_init() {
    set_max_level(log::LevelFilter::Info);
    _ = log::set_logger(&RecordingLogger {});
}
