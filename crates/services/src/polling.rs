use cricket_models::{CricketError, LiveMatch, LiveScoreData, MatchPrediction, Result};
use cricket_stream::{Callback, Notification, NotificationBus, SubscriberId, SubscriberRegistry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::Channel;
use crate::generator::SnapshotSource;
use crate::metrics::{ChannelStats, PollingMetrics, TimerGuard};

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub base_interval_ms: u64,
    /// Predictions tick once every `prediction_multiplier` base intervals.
    pub prediction_multiplier: u32,
    pub notification_capacity: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 5000,
            prediction_multiplier: 2,
            notification_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A snapshot went out to this many callbacks.
    Delivered { subscribers: usize },
    /// Generation failed; subscribers got nothing this tick.
    Failed,
    /// The channel is stopped, so nothing was generated.
    Idle,
}

struct TimerHandle {
    cancel: CancellationToken,
    period: Duration,
}

struct ControlState {
    base_interval: Duration,
    timers: HashMap<Channel, TimerHandle>,
}

struct Inner {
    source: Arc<dyn SnapshotSource>,
    runtime: Handle,
    prediction_multiplier: u32,
    // Serialises subscriber changes with timer changes. Never held while
    // callbacks run.
    control: Mutex<ControlState>,
    live_matches: SubscriberRegistry<Vec<LiveMatch>>,
    live_score: SubscriberRegistry<LiveScoreData>,
    predictions: SubscriberRegistry<MatchPrediction>,
    notifications: NotificationBus,
    metrics: Arc<PollingMetrics>,
}

/// Timer-driven fan-out of mock snapshots to subscribed callbacks.
///
/// Each [`Channel`] runs its own timer while it has subscribers. Cloning is
/// cheap and every clone drives the same timers.
#[derive(Clone)]
pub struct PollingService {
    inner: Arc<Inner>,
}

impl PollingService {
    /// Build a service on the current tokio runtime.
    pub fn new(source: Arc<dyn SnapshotSource>, config: PollingConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CricketError::NoRuntime)?;
        Self::with_handle(source, config, runtime)
    }

    pub fn with_handle(source: Arc<dyn SnapshotSource>, config: PollingConfig, runtime: Handle) -> Result<Self> {
        if config.base_interval_ms == 0 {
            return Err(CricketError::InvalidInterval { ms: 0 });
        }

        info!("🎯 Creating PollingService");
        info!("⚙️  Base interval: {}ms", config.base_interval_ms);
        info!("🔮 Prediction multiplier: {}x", config.prediction_multiplier.max(1));

        Ok(Self {
            inner: Arc::new(Inner {
                source,
                runtime,
                prediction_multiplier: config.prediction_multiplier.max(1),
                control: Mutex::new(ControlState {
                    base_interval: Duration::from_millis(config.base_interval_ms),
                    timers: HashMap::new(),
                }),
                live_matches: SubscriberRegistry::new(),
                live_score: SubscriberRegistry::new(),
                predictions: SubscriberRegistry::new(),
                notifications: NotificationBus::new(config.notification_capacity),
                metrics: Arc::new(PollingMetrics::new()),
            }),
        })
    }

    pub fn subscribe_live_matches<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[LiveMatch]) + Send + Sync + 'static,
    {
        let callback: Callback<Vec<LiveMatch>> = Arc::new(move |matches: &Vec<LiveMatch>| callback(matches));
        self.subscribe_with(Channel::LiveMatches, &self.inner.live_matches, callback)
    }

    pub fn subscribe_live_score<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LiveScoreData) + Send + Sync + 'static,
    {
        let callback: Callback<LiveScoreData> = Arc::new(callback);
        self.subscribe_with(Channel::LiveScore, &self.inner.live_score, callback)
    }

    pub fn subscribe_predictions<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MatchPrediction) + Send + Sync + 'static,
    {
        let callback: Callback<MatchPrediction> = Arc::new(callback);
        self.subscribe_with(Channel::Predictions, &self.inner.predictions, callback)
    }

    fn subscribe_with<T>(&self, channel: Channel, registry: &SubscriberRegistry<T>, callback: Callback<T>) -> Subscription {
        let mut control = self.inner.control.lock();
        let id = registry.insert(callback);
        debug!("➕ Subscriber {} joined {}", id.value(), channel);
        self.inner.start_locked(&mut control, channel);

        Subscription {
            inner: Arc::downgrade(&self.inner),
            channel,
            id,
            active: true,
        }
    }

    /// Start a channel's timer. Returns `false` if it was already running.
    pub fn start(&self, channel: Channel) -> bool {
        let mut control = self.inner.control.lock();
        self.inner.start_locked(&mut control, channel)
    }

    /// Stop a channel's timer. Returns `false` if it was not running.
    /// Subscribers stay registered.
    pub fn stop(&self, channel: Channel) -> bool {
        let mut control = self.inner.control.lock();
        self.inner.stop_locked(&mut control, channel)
    }

    pub fn start_live_matches_polling(&self) -> bool {
        self.start(Channel::LiveMatches)
    }

    pub fn stop_live_matches_polling(&self) -> bool {
        self.stop(Channel::LiveMatches)
    }

    pub fn start_live_score_polling(&self) -> bool {
        self.start(Channel::LiveScore)
    }

    pub fn stop_live_score_polling(&self) -> bool {
        self.stop(Channel::LiveScore)
    }

    pub fn start_predictions_polling(&self) -> bool {
        self.start(Channel::Predictions)
    }

    pub fn stop_predictions_polling(&self) -> bool {
        self.stop(Channel::Predictions)
    }

    /// Change the base interval and restart whichever timers are running.
    /// Each restarted timer delivers once straight away.
    pub fn set_polling_interval(&self, ms: u64) -> Result<()> {
        if ms == 0 {
            return Err(CricketError::InvalidInterval { ms });
        }

        let mut control = self.inner.control.lock();
        control.base_interval = Duration::from_millis(ms);

        let running: Vec<Channel> = Channel::ALL
            .into_iter()
            .filter(|channel| control.timers.contains_key(channel))
            .collect();
        for channel in &running {
            self.inner.stop_locked(&mut control, *channel);
            self.inner.start_locked(&mut control, *channel);
        }

        info!("⏱️  Polling interval set to {}ms ({} timers restarted)", ms, running.len());
        Ok(())
    }

    /// Stop every timer. Used at application teardown.
    pub fn cleanup(&self) {
        let mut control = self.inner.control.lock();
        for channel in Channel::ALL {
            self.inner.stop_locked(&mut control, channel);
        }
        info!("🧹 PollingService cleaned up");
    }

    /// Tick a running channel immediately, outside its timer cadence.
    pub fn poll_now(&self, channel: Channel) -> TickOutcome {
        if !self.is_running(channel) {
            return TickOutcome::Idle;
        }
        self.inner.fire(channel)
    }

    pub fn is_running(&self, channel: Channel) -> bool {
        self.inner.control.lock().timers.contains_key(&channel)
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.inner.subscriber_count(channel)
    }

    pub fn polling_interval(&self) -> Duration {
        self.inner.control.lock().base_interval
    }

    /// Cadence the channel would run at if started now.
    pub fn interval_for(&self, channel: Channel) -> Duration {
        let base = self.polling_interval();
        self.inner.period_for(base, channel)
    }

    /// Cadence of the channel's live timer, if it has one.
    pub fn active_interval(&self, channel: Channel) -> Option<Duration> {
        self.inner
            .control
            .lock()
            .timers
            .get(&channel)
            .map(|timer| timer.period)
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    /// Raise a notification on the service's bus. Returns how many
    /// listeners received it.
    pub fn publish(&self, notification: Notification) -> usize {
        self.inner.notifications.publish(notification)
    }

    pub fn stats(&self, channel: Channel) -> ChannelStats {
        self.inner.metrics.snapshot(channel)
    }

    pub fn log_summary(&self) {
        self.inner.metrics.log_summary();
    }
}

impl Inner {
    fn period_for(&self, base: Duration, channel: Channel) -> Duration {
        match channel {
            Channel::Predictions => base * self.prediction_multiplier,
            Channel::LiveMatches | Channel::LiveScore => base,
        }
    }

    fn subscriber_count(&self, channel: Channel) -> usize {
        match channel {
            Channel::LiveMatches => self.live_matches.len(),
            Channel::LiveScore => self.live_score.len(),
            Channel::Predictions => self.predictions.len(),
        }
    }

    fn remove_subscriber(&self, channel: Channel, id: SubscriberId) -> Option<usize> {
        match channel {
            Channel::LiveMatches => self.live_matches.remove(id),
            Channel::LiveScore => self.live_score.remove(id),
            Channel::Predictions => self.predictions.remove(id),
        }
    }

    fn unsubscribe(self: &Arc<Self>, channel: Channel, id: SubscriberId) {
        let mut control = self.control.lock();
        match self.remove_subscriber(channel, id) {
            Some(0) => {
                debug!("➖ Last subscriber {} left {}", id.value(), channel);
                self.stop_locked(&mut control, channel);
            }
            Some(remaining) => {
                debug!("➖ Subscriber {} left {} ({} remaining)", id.value(), channel, remaining);
            }
            None => {}
        }
    }

    fn start_locked(self: &Arc<Self>, control: &mut ControlState, channel: Channel) -> bool {
        if control.timers.contains_key(&channel) {
            return false;
        }

        let period = self.period_for(control.base_interval, channel);
        let cancel = CancellationToken::new();
        self.spawn_timer(channel, period, cancel.clone());
        control.timers.insert(channel, TimerHandle { cancel, period });

        info!("▶️  Started {} polling every {}ms", channel, period.as_millis());
        true
    }

    fn stop_locked(&self, control: &mut ControlState, channel: Channel) -> bool {
        match control.timers.remove(&channel) {
            Some(timer) => {
                timer.cancel.cancel();
                info!("⏹️  Stopped {} polling", channel);
                true
            }
            None => false,
        }
    }

    fn spawn_timer(self: &Arc<Self>, channel: Channel, period: Duration, cancel: CancellationToken) {
        let weak = Arc::downgrade(self);
        let guard = TimerGuard::new(self.metrics.clone(), channel);

        self.runtime.spawn(async move {
            let _guard = guard;
            // First tick completes immediately, so a fresh timer delivers at once.
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(inner) = weak.upgrade() else { break };
                        inner.fire(channel);
                    }
                }
            }
            debug!("{} timer task exited", channel);
        });
    }

    fn fire(&self, channel: Channel) -> TickOutcome {
        match channel {
            Channel::LiveMatches => self.deliver(channel, &self.live_matches, || self.source.live_matches()),
            Channel::LiveScore => self.deliver(channel, &self.live_score, || self.source.live_score()),
            Channel::Predictions => self.deliver(channel, &self.predictions, || self.source.prediction()),
        }
    }

    fn deliver<T>(
        &self,
        channel: Channel,
        registry: &SubscriberRegistry<T>,
        generate: impl FnOnce() -> Result<T>,
    ) -> TickOutcome {
        match generate() {
            Ok(snapshot) => {
                let subscribers = registry.notify(&snapshot);
                self.metrics.record_delivery(channel, subscribers);
                debug!("📡 {} tick delivered to {} subscribers", channel, subscribers);
                TickOutcome::Delivered { subscribers }
            }
            Err(e) => {
                warn!("❌ Failed to generate {} snapshot: {}", channel, e);
                self.metrics.record_failure(channel);
                self.notifications.publish(Notification::error(
                    channel.name(),
                    format!("Failed to refresh {channel}: {e}"),
                ));
                TickOutcome::Failed
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.control.get_mut().timers.drain() {
            timer.cancel.cancel();
        }
    }
}

/// Handle returned by the `subscribe_*` methods.
///
/// Unsubscribes when dropped; the last subscriber leaving stops the
/// channel's timer.
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    inner: Weak<Inner>,
    channel: Channel,
    id: SubscriberId,
    active: bool,
}

impl Subscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.inner.upgrade() {
            inner.unsubscribe(self.channel, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockDataGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn service(interval_ms: u64) -> PollingService {
        PollingService::new(
            Arc::new(MockDataGenerator::with_seed(1)),
            PollingConfig {
                base_interval_ms: interval_ms,
                ..PollingConfig::default()
            },
        )
        .unwrap()
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let bump = {
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };
        (count, bump)
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let result = PollingService::new(Arc::new(MockDataGenerator::new()), PollingConfig::default());
        assert!(matches!(result, Err(CricketError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let result = PollingService::new(
            Arc::new(MockDataGenerator::new()),
            PollingConfig {
                base_interval_ms: 0,
                ..PollingConfig::default()
            },
        );
        assert!(matches!(result, Err(CricketError::InvalidInterval { ms: 0 })));

        let service = service(1000);
        assert!(service.set_polling_interval(0).is_err());
        assert_eq!(service.polling_interval(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let service = service(5000);
        let (count, bump) = counter();
        let _sub = service.subscribe_live_score(move |_| bump());

        sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(4998)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predictions_run_at_double_interval() {
        let service = service(1000);
        assert_eq!(service.interval_for(Channel::Predictions), Duration::from_millis(2000));

        let (count, bump) = counter();
        let _sub = service.subscribe_predictions(move |_| bump());

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_timer() {
        let service = service(1000);
        assert!(service.start_live_matches_polling());
        assert!(!service.start_live_matches_polling());

        tokio::task::yield_now().await;
        assert_eq!(service.stats(Channel::LiveMatches).timer_tasks, 1);

        sleep(Duration::from_millis(1001)).await;
        assert_eq!(service.stats(Channel::LiveMatches).ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let service = service(1000);
        assert!(!service.stop_live_score_polling());
        assert!(service.start_live_score_polling());
        assert!(service.stop_live_score_polling());
        assert!(!service.stop_live_score_polling());

        tokio::task::yield_now().await;
        assert_eq!(service.stats(Channel::LiveScore).timer_tasks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_now_only_on_running_channel() {
        let service = service(60_000);
        let (count, bump) = counter();

        assert_eq!(service.poll_now(Channel::LiveScore), TickOutcome::Idle);

        let sub = service.subscribe_live_score(move |_| bump());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert_eq!(service.poll_now(Channel::LiveScore), TickOutcome::Delivered { subscribers: 1 });
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        assert_eq!(service.poll_now(Channel::LiveScore), TickOutcome::Idle);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_inside_callback() {
        let service = service(1000);
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let (count, bump) = counter();

        let sub = {
            let slot = slot.clone();
            service.subscribe_live_matches(move |_| {
                bump();
                if let Some(sub) = slot.lock().take() {
                    sub.unsubscribe();
                }
            })
        };
        *slot.lock() = Some(sub);

        sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!service.is_running(Channel::LiveMatches));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_service_ends_timers() {
        let service = service(1000);
        let metrics = service.inner.metrics.clone();
        let sub = service.subscribe_live_score(|_| {});
        tokio::task::yield_now().await;
        assert_eq!(metrics.snapshot(Channel::LiveScore).timer_tasks, 1);

        drop(service);
        tokio::task::yield_now().await;
        assert_eq!(metrics.snapshot(Channel::LiveScore).timer_tasks, 0);

        // Outliving the service is fine.
        assert!(sub.is_active());
        drop(sub);
    }
}
