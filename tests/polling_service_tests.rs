mod common;

use common::{call_counter, calls, create_service_with, create_test_service, FlakySource};
use cricket_models::stats::round_to;
use cricket_services::{Channel, TickOutcome};
use cricket_stream::NotificationLevel;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[tokio::test(start_paused = true)]
async fn test_live_score_tick_carries_strike_rate() {
    let service = create_test_service(5000);
    let received = Arc::new(Mutex::new(None));

    let _sub = {
        let received = received.clone();
        service.subscribe_live_score(move |score| {
            *received.lock() = Some(score.clone());
        })
    };

    sleep(Duration::from_millis(1)).await;

    let score = received.lock().take().expect("the first tick should have delivered a snapshot");
    let batsman = &score.batsmen[0];
    let expected = round_to(f64::from(batsman.runs) / f64::from(batsman.balls) * 100.0, 1);
    assert_eq!(batsman.strike_rate, expected);
}

#[tokio::test(start_paused = true)]
async fn test_predictions_arrive_without_waiting_an_interval() {
    let service = create_test_service(5000);
    let (count, bump) = call_counter();
    let _sub = service.subscribe_predictions(move |_| bump());

    sleep(Duration::from_millis(1)).await;
    assert_eq!(calls(&count), 1);

    // Then at double the base interval.
    sleep(Duration::from_millis(9998)).await;
    assert_eq!(calls(&count), 1);
    sleep(Duration::from_millis(2)).await;
    assert_eq!(calls(&count), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_subscriber_keeps_receiving() {
    let service = create_test_service(1000);
    let (first_count, first_bump) = call_counter();
    let (second_count, second_bump) = call_counter();

    let first = service.subscribe_live_matches(move |_| first_bump());
    let _second = service.subscribe_live_matches(move |_| second_bump());
    assert_eq!(service.subscriber_count(Channel::LiveMatches), 2);

    sleep(Duration::from_millis(1001)).await;
    assert_eq!(calls(&first_count), 2);
    assert_eq!(calls(&second_count), 2);

    first.unsubscribe();
    assert!(service.is_running(Channel::LiveMatches));
    assert_eq!(service.subscriber_count(Channel::LiveMatches), 1);

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(calls(&first_count), 2);
    assert_eq!(calls(&second_count), 4);
}

#[tokio::test(start_paused = true)]
async fn test_last_unsubscribe_stops_timer() {
    let service = create_test_service(1000);
    let (count, bump) = call_counter();

    let sub = service.subscribe_live_matches(move |_| bump());
    assert!(service.is_running(Channel::LiveMatches));

    sleep(Duration::from_millis(1001)).await;
    assert_eq!(calls(&count), 2);

    sub.unsubscribe();
    assert!(!service.is_running(Channel::LiveMatches));

    sleep(Duration::from_millis(5000)).await;
    assert_eq!(calls(&count), 2);
    assert_eq!(service.poll_now(Channel::LiveMatches), TickOutcome::Idle);
    assert_eq!(service.stats(Channel::LiveMatches).timer_tasks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_subscription_unsubscribes() {
    let service = create_test_service(1000);
    {
        let _sub = service.subscribe_predictions(|_| {});
        assert!(service.is_running(Channel::Predictions));
    }
    assert!(!service.is_running(Channel::Predictions));
    assert_eq!(service.subscriber_count(Channel::Predictions), 0);
}

#[tokio::test(start_paused = true)]
async fn test_callbacks_run_in_registration_order() {
    let service = create_test_service(1000);
    let order = Arc::new(Mutex::new(Vec::new()));

    let subs: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|tag| {
            let order = order.clone();
            service.subscribe_live_score(move |_| order.lock().push(tag))
        })
        .collect();

    sleep(Duration::from_millis(1001)).await;
    assert_eq!(*order.lock(), vec!["a", "b", "c", "a", "b", "c"]);
    drop(subs);
}

#[tokio::test(start_paused = true)]
async fn test_set_interval_restarts_only_running_timers() {
    let service = create_test_service(5000);
    let (count, bump) = call_counter();
    let _sub = service.subscribe_live_score(move |_| bump());

    assert_eq!(service.active_interval(Channel::LiveScore), Some(Duration::from_millis(5000)));
    assert_eq!(service.active_interval(Channel::Predictions), None);

    service.set_polling_interval(1000).unwrap();

    assert_eq!(service.polling_interval(), Duration::from_millis(1000));
    assert_eq!(service.active_interval(Channel::LiveScore), Some(Duration::from_millis(1000)));
    assert!(!service.is_running(Channel::Predictions));
    assert!(!service.is_running(Channel::LiveMatches));
    assert_eq!(service.subscriber_count(Channel::LiveScore), 1);
    assert_eq!(service.interval_for(Channel::Predictions), Duration::from_millis(2000));

    // The restarted timer delivers at once, then every second.
    sleep(Duration::from_millis(3001)).await;
    assert_eq!(calls(&count), 4);

    tokio::task::yield_now().await;
    assert_eq!(service.stats(Channel::LiveScore).timer_tasks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_is_reported_not_fatal() {
    let source = Arc::new(FlakySource::new());
    let service = create_service_with(source.clone(), 1000);
    let mut notifications = service.notifications();
    let (count, bump) = call_counter();
    let _sub = service.subscribe_live_score(move |_| bump());

    source.set_failing(true);
    sleep(Duration::from_millis(1)).await;

    assert_eq!(calls(&count), 0);
    assert!(service.is_running(Channel::LiveScore));
    let notification = notifications.try_recv().expect("failure should raise a notification");
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.source, "live_score");
    assert!(notification.message.contains("feed unavailable"));

    source.set_failing(false);
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(calls(&count), 1);

    let stats = service.stats(Channel::LiveScore);
    assert_eq!(stats.ticks, 2);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.deliveries, 1);
}

#[tokio::test(start_paused = true)]
async fn test_poll_now_reports_failure() {
    let source = Arc::new(FlakySource::new());
    let service = create_service_with(source.clone(), 60_000);
    let _sub = service.subscribe_predictions(|_| {});

    source.set_failing(true);
    assert_eq!(service.poll_now(Channel::Predictions), TickOutcome::Failed);
    source.set_failing(false);
    assert_eq!(
        service.poll_now(Channel::Predictions),
        TickOutcome::Delivered { subscribers: 1 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_stops_everything_but_keeps_subscribers() {
    let service = create_test_service(1000);
    let (count, bump) = call_counter();

    let _matches = service.subscribe_live_matches({
        let bump = bump.clone();
        move |_| bump()
    });
    let _score = service.subscribe_live_score(move |_| bump());
    assert!(service.start_predictions_polling());

    service.cleanup();

    for channel in Channel::ALL {
        assert!(!service.is_running(channel), "{channel} still running");
    }
    assert_eq!(service.subscriber_count(Channel::LiveMatches), 1);
    assert_eq!(service.subscriber_count(Channel::LiveScore), 1);

    sleep(Duration::from_millis(3000)).await;
    assert_eq!(calls(&count), 0);
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_after_stop_resumes_timer() {
    let service = create_test_service(1000);
    let _first = service.subscribe_live_score(|_| {});
    assert!(service.stop_live_score_polling());
    assert!(!service.is_running(Channel::LiveScore));

    let _second = service.subscribe_live_score(|_| {});
    assert!(service.is_running(Channel::LiveScore));
}

fn running_matches_subscribers(ops: Vec<(bool, prop::sample::Index)>) -> Result<(), TestCaseError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    runtime.block_on(async move {
        let service = create_test_service(1000);
        let mut held = Vec::new();

        for (subscribe, index) in ops {
            if subscribe || held.is_empty() {
                held.push(service.subscribe_live_matches(|_| {}));
            } else {
                let sub = held.remove(index.index(held.len()));
                sub.unsubscribe();
            }

            let count = service.subscriber_count(Channel::LiveMatches);
            prop_assert_eq!(count, held.len());
            prop_assert_eq!(service.is_running(Channel::LiveMatches), count > 0);

            tokio::task::yield_now().await;
            let expected_tasks = usize::from(count > 0);
            prop_assert_eq!(service.stats(Channel::LiveMatches).timer_tasks, expected_tasks);
        }
        Ok::<(), TestCaseError>(())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_timer_running_iff_subscribed(
        ops in prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 1..40)
    ) {
        running_matches_subscribers(ops)?;
    }
}
