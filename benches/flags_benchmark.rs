use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use insurance_flags::{FeatureFlags, Flag, LocalAdapter, Reason, Snapshot};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn flags() -> Arc<FeatureFlags> {
    let adapter = Arc::new(LocalAdapter::from([("enhancedPolicyView", true)]));
    Arc::new(
        FeatureFlags::builder(adapter)
            .build_time_key(None)
            .build()
            .unwrap(),
    )
}

fn is_enabled_bench(c: &mut Criterion) {
    let flags = flags();
    c.bench_function("is_enabled", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let mut handles = Vec::new();
            for _ in 0..200 {
                let fl = flags.clone();
                handles.push(tokio::spawn(async move {
                    for flag in Flag::ALL {
                        fl.is_enabled(flag);
                    }
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }
        });
    });
}

fn set_snapshot_bench(c: &mut Criterion) {
    let flags = flags();
    let mut subs = Vec::new();
    for _ in 0..10 {
        subs.push(flags.subscribe(Arc::new(|_: &Reason, snapshot: &Snapshot| {
            snapshot.get("alertsBanner");
        })));
    }
    c.bench_function("set_snapshot", |b| {
        b.iter(|| flags.set_snapshot(Reason::Fetched));
    });
}

criterion_group!(benches, is_enabled_bench, set_snapshot_bench);
criterion_main!(benches);
