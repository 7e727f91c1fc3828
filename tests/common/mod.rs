// Common test utilities and helpers

#![allow(dead_code)]

use cricket_models::{CricketError, LiveMatch, LiveScoreData, MatchPrediction, Result};
use cricket_services::{MockDataGenerator, PollingConfig, PollingService, SnapshotSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock generator that can be told to fail every call.
pub struct FlakySource {
    inner: MockDataGenerator,
    failing: AtomicBool,
}

impl FlakySource {
    pub fn new() -> Self {
        Self {
            inner: MockDataGenerator::with_seed(2024),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CricketError::Generation {
                reason: "feed unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl SnapshotSource for FlakySource {
    fn live_matches(&self) -> Result<Vec<LiveMatch>> {
        self.check()?;
        self.inner.live_matches()
    }

    fn live_score(&self) -> Result<LiveScoreData> {
        self.check()?;
        self.inner.live_score()
    }

    fn prediction(&self) -> Result<MatchPrediction> {
        self.check()?;
        self.inner.prediction()
    }
}

/// A service over a seeded generator. Must be called inside a tokio runtime.
pub fn create_test_service(interval_ms: u64) -> PollingService {
    create_service_with(Arc::new(MockDataGenerator::with_seed(7)), interval_ms)
}

pub fn create_service_with(source: Arc<dyn SnapshotSource>, interval_ms: u64) -> PollingService {
    PollingService::new(
        source,
        PollingConfig {
            base_interval_ms: interval_ms,
            ..PollingConfig::default()
        },
    )
    .expect("test service should build inside a runtime")
}

/// Shared call counter plus a callback-friendly bump closure.
pub fn call_counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + Clone + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let bump = {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, bump)
}

pub fn calls(count: &AtomicUsize) -> usize {
    count.load(Ordering::SeqCst)
}
