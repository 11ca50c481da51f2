//! Retention tests: the trim operations, plus property tests for the
//! range-read and trim contracts over arbitrary timestamp sets.

use palaver::{ChatMessage, ChatRoomLog, MessageId, Timestamp};
use proptest::prelude::*;

fn log_with_timestamps(times: &[i64]) -> ChatRoomLog {
    let log = ChatRoomLog::new();
    for (i, &millis) in times.iter().enumerate() {
        let ts = Timestamp(millis);
        let msg = ChatMessage::from_parts(
            MessageId::generate(ts),
            ts,
            None,
            format!("message {}", i),
        );
        log.append(msg).unwrap();
    }
    log
}

#[test]
fn test_retention_job_scenario() {
    // A periodic retention pass: first by age, then by count.
    let log = log_with_timestamps(&[100, 200, 300, 400, 500, 600]);

    assert_eq!(log.trim(Some(Timestamp(300)), None), 2);
    assert_eq!(log.len(), 4);

    assert_eq!(log.trim(None, Some(3)), 1);
    let kept: Vec<i64> = log.read_all().iter().map(|m| m.created_at.0).collect();
    assert_eq!(kept, vec![400, 500, 600]);
}

#[test]
fn test_trim_does_not_disturb_returned_snapshots() {
    let log = log_with_timestamps(&[100, 200, 300]);

    let snapshot = log.read_since(Timestamp(0));
    log.trim(None, Some(0));

    assert_eq!(snapshot.len(), 3);
    assert!(log.is_empty());
}

proptest! {
    #[test]
    fn prop_read_since_is_exact_inclusive_filter(
        times in proptest::collection::vec(0i64..1_000_000, 0..200),
        cutoff in 0i64..1_000_000,
    ) {
        let log = log_with_timestamps(&times);
        let result = log.read_since(Timestamp(cutoff));

        let expected = times.iter().filter(|&&t| t >= cutoff).count();
        prop_assert_eq!(result.len(), expected);

        for message in &result {
            prop_assert!(message.created_at.0 >= cutoff);
        }
        for pair in result.windows(2) {
            prop_assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn prop_read_since_is_subset_of_read_all(
        times in proptest::collection::vec(0i64..1_000_000, 0..200),
        cutoff in 0i64..1_000_000,
    ) {
        let log = log_with_timestamps(&times);
        let all: Vec<MessageId> = log.read_all().iter().map(|m| m.id).collect();

        for message in log.read_since(Timestamp(cutoff)) {
            prop_assert!(all.contains(&message.id));
        }
        prop_assert_eq!(all.len(), times.len());
    }

    #[test]
    fn prop_trim_by_age_removes_exactly_the_older(
        times in proptest::collection::vec(0i64..1_000_000, 0..200),
        cutoff in 0i64..1_000_000,
    ) {
        let log = log_with_timestamps(&times);
        let removed = log.trim(Some(Timestamp(cutoff)), None);

        let expected_removed = times.iter().filter(|&&t| t < cutoff).count();
        prop_assert_eq!(removed, expected_removed);

        for survivor in log.read_all() {
            prop_assert!(survivor.created_at.0 >= cutoff);
        }
    }

    #[test]
    fn prop_trim_by_count_keeps_the_newest(
        times in proptest::collection::vec(0i64..1_000_000, 0..200),
        keep in 0usize..50,
    ) {
        let log = log_with_timestamps(&times);
        let before = log.read_all();
        let removed = log.trim(None, Some(keep));

        prop_assert_eq!(removed, before.len().saturating_sub(keep));
        prop_assert_eq!(log.len(), before.len().min(keep));

        // The kept messages are exactly the tail of the pre-trim order.
        let kept: Vec<MessageId> = log.read_all().iter().map(|m| m.id).collect();
        let expected_tail: Vec<MessageId> = before
            .iter()
            .skip(before.len().saturating_sub(keep))
            .map(|m| m.id)
            .collect();
        prop_assert_eq!(kept, expected_tail);
    }

    #[test]
    fn prop_trim_applying_both_equals_sequential(
        times in proptest::collection::vec(0i64..1_000_000, 0..200),
        cutoff in 0i64..1_000_000,
        keep in 0usize..50,
    ) {
        let combined = log_with_timestamps(&times);
        let sequential = log_with_timestamps(&times);

        let combined_removed = combined.trim(Some(Timestamp(cutoff)), Some(keep));
        let removed_first = sequential.trim(Some(Timestamp(cutoff)), None);
        let removed_second = sequential.trim(None, Some(keep));

        prop_assert_eq!(combined_removed, removed_first + removed_second);
        prop_assert_eq!(combined.len(), sequential.len());

        let combined_times: Vec<i64> =
            combined.read_all().iter().map(|m| m.created_at.0).collect();
        let sequential_times: Vec<i64> =
            sequential.read_all().iter().map(|m| m.created_at.0).collect();
        prop_assert_eq!(combined_times, sequential_times);
    }
}
