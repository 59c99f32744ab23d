//! Notification delivery with faults injected on each side independently

use std::sync::Arc;

use model_arena::metrics::{MetricSet, RegressionMetrics, TaskType};
use model_arena::notify::{
    MemoryNotificationChannel, NotificationDispatcher, TrainingSummary, TRAINING_COMPLETE_TITLE,
};
use serde_json::Value;

fn summary() -> TrainingSummary {
    let winner = MetricSet::regression("gbr", RegressionMetrics::new().r2(0.8123));
    TrainingSummary::from_winner(&winner, "houses")
}

fn setup() -> (Arc<MemoryNotificationChannel>, NotificationDispatcher) {
    let channel = Arc::new(MemoryNotificationChannel::new());
    (channel.clone(), NotificationDispatcher::new(channel))
}

#[tokio::test]
async fn test_push_and_log_carry_same_content() {
    let (channel, dispatcher) = setup();
    dispatcher.notify(21, &summary()).await;

    let pushed = channel.published("user_21");
    let logged = channel.log_entries(21);
    assert_eq!(pushed.len(), 1);
    assert_eq!(logged.len(), 1);

    let (entry_id, entry) = &logged[0];
    assert!(uuid::Uuid::parse_str(entry_id).is_ok());
    assert_eq!(entry.title, TRAINING_COMPLETE_TITLE);
    assert_eq!(entry.body, pushed[0].body);
    assert_eq!(entry.data, pushed[0].payload);
    assert_eq!(entry.data["type"], Value::from("TRAINING_COMPLETE"));
    assert_eq!(entry.data["modelName"], Value::from("gbr"));
    assert!(!entry.read);
}

#[tokio::test]
async fn test_push_side_fault_still_logs() {
    let (channel, dispatcher) = setup();
    channel.set_fail_push(true);

    // never panics, never errors
    dispatcher.notify(22, &summary()).await;

    assert_eq!(channel.publish_count(), 0);
    assert_eq!(channel.log_entries(22).len(), 1);
}

#[tokio::test]
async fn test_log_side_fault_still_pushes() {
    let (channel, dispatcher) = setup();
    channel.set_fail_log(true);

    let report = dispatcher.deliver(23, &summary()).await;

    assert!(report.push.is_ok());
    assert!(report.log.is_err());
    assert_eq!(channel.published("user_23").len(), 1);
    assert_eq!(channel.log_count(), 0);
}

#[tokio::test]
async fn test_both_sides_faulted() {
    let (channel, dispatcher) = setup();
    channel.set_fail_push(true);
    channel.set_fail_log(true);

    let report = dispatcher.deliver(24, &summary()).await;
    assert!(!report.is_complete());
    assert!(report.push.is_err() && report.log.is_err());
}

#[tokio::test]
async fn test_spawned_notifications_are_at_least_once() {
    let (channel, dispatcher) = setup();
    let handles: Vec<_> = (0..5)
        .map(|_| dispatcher.spawn_notify(25, summary()))
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(channel.published("user_25").len(), 5);
    let ids: std::collections::HashSet<_> =
        channel.log_entries(25).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_summary_from_winner() {
    let s = summary();
    assert_eq!(s.model_name, "gbr");
    assert_eq!(s.score, Some(0.8123));
    assert_eq!(s.task_type, TaskType::Regression);
}
