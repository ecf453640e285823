use chrono::Duration;
use proptest::prelude::*;
use std::sync::Arc;

use handle_resolver::services::NameCache;
use handle_resolver::{CacheConfig, ManualClock};

#[derive(Debug, Clone)]
enum Op {
    Put(u8),
    Fail(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..40).prop_map(Op::Put),
        1 => (0u8..40).prop_map(Op::Fail),
    ]
}

fn cache(max_size: usize) -> (NameCache, ManualClock) {
    let clock = ManualClock::default();
    let config = CacheConfig {
        max_size,
        ..CacheConfig::default()
    };
    (NameCache::new(&config, Arc::new(clock.clone())), clock)
}

fn apply(cache: &mut NameCache, op: &Op) -> String {
    match op {
        Op::Put(i) => {
            let handle = format!("@h{i}");
            cache.put(&handle, format!("Name {i}"));
            handle
        }
        Op::Fail(i) => {
            let handle = format!("@h{i}");
            cache.record_failure(&handle);
            handle
        }
    }
}

proptest! {
    /// Property: size never exceeds the configured maximum
    #[test]
    fn prop_size_bounded(max_size in 1usize..16, ops in prop::collection::vec(op(), 0..200)) {
        let (mut cache, _) = cache(max_size);
        for op in &ops {
            apply(&mut cache, op);
            prop_assert!(cache.len() <= max_size);
        }
    }

    /// Property: the most recently touched handle is never the one evicted
    #[test]
    fn prop_touched_entry_survives(max_size in 2usize..16, ops in prop::collection::vec(op(), 1..200)) {
        let (mut cache, _) = cache(max_size);
        for op in &ops {
            let handle = apply(&mut cache, op);
            prop_assert!(cache.entry(&handle).is_some());
        }
    }

    /// Property: snapshot order lists handles from least to most recently touched
    #[test]
    fn prop_snapshot_ends_with_last_touched(ops in prop::collection::vec(op(), 1..100)) {
        let (mut cache, _) = cache(1000);
        let mut last = String::new();
        for op in &ops {
            last = apply(&mut cache, op);
        }
        let snapshot = cache.snapshot();
        prop_assert_eq!(snapshot.keys().last(), Some(&last));
        prop_assert_eq!(snapshot.len(), cache.len());
    }

    /// Property: sweeps only ever remove failure-free entries
    #[test]
    fn prop_sweep_keeps_failures(ops in prop::collection::vec(op(), 1..100), days in 0i64..5) {
        let (mut cache, clock) = cache(1000);
        for op in &ops {
            apply(&mut cache, op);
        }
        let failing_before = cache.stats().failing;

        clock.advance(Duration::days(days));
        cache.sweep_expired();

        prop_assert_eq!(cache.stats().failing, failing_before);
        if days > 2 {
            prop_assert_eq!(cache.len(), failing_before);
        }
    }
}
