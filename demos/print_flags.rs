use insurance_flags::*;
use log::kv::Key;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Info level logging shows which key source was used and every snapshot update.
    log::set_max_level(LevelFilter::Info);
    log::set_logger(&PrintLog {}).unwrap();

    let adapter = RemoteAdapter::builder("https://flags.example.com")
        .polling_mode(PollingMode::AutoPoll(Duration::from_secs(30)))
        .build()
        .unwrap();

    let flags = FeatureFlags::builder(Arc::new(adapter))
        .base_url("http://localhost:5173/")
        .build()
        .unwrap();

    let subscription = flags.subscribe(Arc::new(|reason: &Reason, snapshot: &Snapshot| {
        println!("snapshot ({reason}): {:?}", snapshot.values());
    }));

    flags.initialize(InitConfig::default()).await;

    let values = flags.values();
    println!("alertsBanner: {}", values.alerts_banner);
    println!("enhancedPolicyView: {}", values.enhanced_policy_view);

    subscription.unsubscribe();
    flags.close();
}

// Example log implementation.
pub struct PrintLog {}

impl Log for PrintLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().contains("insurance_flags")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        match record.key_values().get(Key::from("event_id")) {
            Some(event_id) => println!("{level} [{event_id}] {}", record.args()),
            None => println!("{level} {}", record.args()),
        }
    }

    fn flush(&self) {}
}
