use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::channel::Channel;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChannelStats {
    pub ticks: u64,
    pub deliveries: u64,
    pub failures: u64,
    pub timer_tasks: usize,
    pub last_tick: Option<DateTime<Utc>>,
}

impl ChannelStats {
    pub fn failure_rate_percent(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.failures as f64 / self.ticks as f64 * 100.0
    }
}

/// Per-channel tick counters kept by the polling service.
#[derive(Default)]
pub struct PollingMetrics {
    channels: Mutex<HashMap<Channel, ChannelStats>>,
}

impl PollingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delivery(&self, channel: Channel, subscribers: usize) {
        let mut channels = self.channels.lock();
        let stats = channels.entry(channel).or_default();
        stats.ticks += 1;
        stats.deliveries += subscribers as u64;
        stats.last_tick = Some(Utc::now());
    }

    pub fn record_failure(&self, channel: Channel) {
        let mut channels = self.channels.lock();
        let stats = channels.entry(channel).or_default();
        stats.ticks += 1;
        stats.failures += 1;
        stats.last_tick = Some(Utc::now());
    }

    pub fn timer_started(&self, channel: Channel) {
        self.channels.lock().entry(channel).or_default().timer_tasks += 1;
    }

    pub fn timer_exited(&self, channel: Channel) {
        let mut channels = self.channels.lock();
        let stats = channels.entry(channel).or_default();
        stats.timer_tasks = stats.timer_tasks.saturating_sub(1);
    }

    pub fn snapshot(&self, channel: Channel) -> ChannelStats {
        self.channels.lock().get(&channel).cloned().unwrap_or_default()
    }

    pub fn log_summary(&self) {
        info!("📈 Polling summary:");
        for channel in Channel::ALL {
            let stats = self.snapshot(channel);
            info!(
                "   {}: {} ticks, {} deliveries, {} failures ({:.1}%)",
                channel,
                stats.ticks,
                stats.deliveries,
                stats.failures,
                stats.failure_rate_percent()
            );
        }
    }
}

/// Keeps a channel's live timer count accurate however the task ends.
pub(crate) struct TimerGuard {
    metrics: Arc<PollingMetrics>,
    channel: Channel,
}

impl TimerGuard {
    pub(crate) fn new(metrics: Arc<PollingMetrics>, channel: Channel) -> Self {
        metrics.timer_started(channel);
        Self { metrics, channel }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.metrics.timer_exited(self.channel);
    }
}
