//! Integration tests for the contraction tracker.
//!
//! Drives the full flow from user actions through storage, statistics, the
//! 5-1-1 rule and provider alerts.

use chrono::{DateTime, Duration, TimeZone, Utc};
use contraction_core::notify::RecordingNotifier;
use contraction_core::{
    ContractionEdit, ContractionTracker, Database, Event, MemoryStore, NotificationPermission,
    TrackerConfig,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn hydrated(backend: MemoryStore) -> ContractionTracker<MemoryStore> {
    let mut tracker = ContractionTracker::new(backend, TrackerConfig::default());
    tracker.hydrate(t0(), &mut RecordingNotifier::granted());
    tracker
}

/// Time `count` 60s contractions, 5 minutes apart, through start/stop.
/// Returns the time the last one stopped and every event produced.
fn time_regular_labor(
    tracker: &mut ContractionTracker<MemoryStore>,
    notifier: &mut RecordingNotifier,
    start: DateTime<Utc>,
    count: i64,
) -> (DateTime<Utc>, Vec<Event>) {
    let mut events = Vec::new();
    let mut last_stop = start;
    for i in 0..count {
        let begin = start + Duration::minutes(5 * i);
        tracker.start(begin);
        last_stop = begin + Duration::seconds(60);
        events.extend(tracker.stop(last_stop, notifier));
    }
    (last_stop, events)
}

fn alerts(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::ProviderAlert { .. }))
        .count()
}

#[test]
fn test_regular_labor_triggers_single_alert() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();

    let (_, events) = time_regular_labor(&mut tracker, &mut notifier, t0(), 12);

    assert_eq!(tracker.contractions().len(), 12);
    assert_eq!(alerts(&events), 1);
    assert_eq!(notifier.shown.len(), 1);
    // The alert fires on the twelfth contraction, not before.
    assert!(matches!(events.last(), Some(Event::ProviderAlert { .. })));
}

#[test]
fn test_sustained_condition_realerts_after_cooldown() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();

    // 20 contractions span 96 minutes; the first alert at minute 56 should
    // repeat once the 30 minute cooldown has passed.
    let (_, events) = time_regular_labor(&mut tracker, &mut notifier, t0(), 20);
    assert_eq!(alerts(&events), 2);
}

#[test]
fn test_clear_all_resets_cooldown() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();

    let (end, first) = time_regular_labor(&mut tracker, &mut notifier, t0(), 12);
    assert_eq!(alerts(&first), 1);

    tracker.clear_all(end);
    assert!(tracker.contractions().is_empty());
    assert!(!tracker.alert_state().alert_shown);

    let restart = end + Duration::minutes(1);
    let (_, second) = time_regular_labor(&mut tracker, &mut notifier, restart, 12);
    assert_eq!(alerts(&second), 1);
}

#[test]
fn test_fewer_than_twelve_never_alerts() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();
    let (end, events) = time_regular_labor(&mut tracker, &mut notifier, t0(), 11);
    assert_eq!(alerts(&events), 0);
    assert!(!tracker.meets_rule(end));
}

#[test]
fn test_alert_without_permission_is_in_app_only() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::unsupported();
    let (_, events) = time_regular_labor(&mut tracker, &mut notifier, t0(), 12);

    match events.last() {
        Some(Event::ProviderAlert {
            system_notified, ..
        }) => assert!(!system_notified),
        other => panic!("Expected ProviderAlert, got {other:?}"),
    }
    assert!(notifier.shown.is_empty());
}

#[test]
fn test_no_alert_before_hydration() {
    let mut tracker = ContractionTracker::new(MemoryStore::new(), TrackerConfig::default());
    let mut notifier = RecordingNotifier::granted();

    let mut events = Vec::new();
    for i in 0..12 {
        let start = t0() + Duration::minutes(5 * i);
        events.extend(tracker.add(start, Some(start + Duration::seconds(60)), start, &mut notifier));
    }
    assert_eq!(alerts(&events), 0);
    assert!(notifier.shown.is_empty());
}

#[test]
fn test_hydration_evaluates_stored_history() {
    let mut seed = hydrated(MemoryStore::new());
    let mut quiet = RecordingNotifier::new(NotificationPermission::Denied);
    let (end, _) = time_regular_labor(&mut seed, &mut quiet, t0(), 12);

    let backend = MemoryStore::new().with_entry(
        "contractions",
        &serde_json::to_string(seed.contractions()).unwrap(),
    );
    let mut tracker = ContractionTracker::new(backend, TrackerConfig::default());
    let mut notifier = RecordingNotifier::granted();
    let events = tracker.hydrate(end, &mut notifier);

    assert_eq!(alerts(&events), 1);
    assert_eq!(tracker.contractions().len(), 12);
}

#[test]
fn test_mutation_before_hydration_keeps_stored_history() {
    let mut seed = hydrated(MemoryStore::new());
    let mut quiet = RecordingNotifier::new(NotificationPermission::Denied);
    time_regular_labor(&mut seed, &mut quiet, t0(), 3);
    let stored = seed.contractions().to_vec();

    let backend = MemoryStore::new().with_entry(
        "contractions",
        &serde_json::to_string(&stored).unwrap(),
    );
    let mut tracker = ContractionTracker::new(backend, TrackerConfig::default());
    let late = t0() + Duration::minutes(30);
    tracker.add(late, Some(late + Duration::seconds(50)), late, &mut quiet);
    tracker.hydrate(late, &mut quiet);

    let list = tracker.contractions();
    assert_eq!(list.len(), 4);
    assert_eq!(list[0].start_time(), late);
    assert_eq!(&list[1..], stored.as_slice());
}

#[test]
fn test_manual_entries_are_sorted_and_editable() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();

    tracker.add(t0() + Duration::minutes(10), Some(t0() + Duration::minutes(11)), t0(), &mut notifier);
    let events = tracker.add(t0(), None, t0(), &mut notifier);
    tracker.add(t0() + Duration::minutes(5), Some(t0() + Duration::minutes(6)), t0(), &mut notifier);

    let open_id = match &events[0] {
        Event::ContractionAdded { contraction, .. } => contraction.id().to_string(),
        other => panic!("Expected ContractionAdded, got {other:?}"),
    };
    assert_eq!(tracker.contractions()[2].id(), open_id);

    tracker.edit(
        &open_id,
        ContractionEdit {
            start_time: t0() + Duration::minutes(20),
            end_time: Some(t0() + Duration::minutes(20) + Duration::seconds(33)),
        },
        t0(),
        &mut notifier,
    );
    assert_eq!(tracker.contractions()[0].id(), open_id);
    assert_eq!(tracker.contractions()[0].duration(), Some(33));

    let starts: Vec<_> = tracker.contractions().iter().map(|c| c.start_time()).collect();
    let mut sorted = starts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(starts, sorted);
}

#[test]
fn test_summary_over_recorded_history() {
    let mut tracker = hydrated(MemoryStore::new());
    let mut notifier = RecordingNotifier::granted();
    for (offset_min, secs) in [(0, 30), (5, 90), (10, 60)] {
        let start = t0() + Duration::minutes(offset_min);
        tracker.add(start, Some(start + Duration::seconds(secs)), start, &mut notifier);
    }

    let summary = tracker.summary();
    assert_eq!(summary.total_contractions, 3);
    assert_eq!(summary.average_duration, 60.0);
    assert_eq!(summary.average_interval, 300.0);
    assert_eq!(
        summary.last_contraction.unwrap().start_time(),
        t0() + Duration::minutes(10)
    );
}

#[test]
fn test_database_backed_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contractions.db");
    let mut notifier = RecordingNotifier::granted();

    let recorded = {
        let db = Database::open_at(&path).unwrap();
        let mut tracker = ContractionTracker::new(db, TrackerConfig::default());
        tracker.hydrate(t0(), &mut notifier);
        tracker.add(t0(), Some(t0() + Duration::seconds(61)), t0(), &mut notifier);
        tracker.add(t0() + Duration::minutes(4), None, t0(), &mut notifier);
        tracker.contractions().to_vec()
    };

    let db = Database::open_at(&path).unwrap();
    let mut tracker = ContractionTracker::new(db, TrackerConfig::default());
    tracker.hydrate(t0(), &mut notifier);
    assert_eq!(tracker.contractions(), recorded.as_slice());
}
