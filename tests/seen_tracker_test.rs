//! Tests for [`SeenTracker`]: the cross-session anti-repetition record.

use std::sync::Arc;

use trivia_supply::cache::{MAX_SEEN_IDS, SeenRecord, SeenTracker, unix_millis};
use trivia_supply::store::{DurableStore, MemoryStore, Table};
use trivia_supply::{Question, QuestionKind};

fn setup() -> (Arc<dyn DurableStore>, SeenTracker) {
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let tracker = SeenTracker::new(Arc::clone(&store));
    (store, tracker)
}

fn id(n: usize) -> String {
    format!("id-{n:03}")
}

#[tokio::test]
async fn empty_without_record() {
    let (_, tracker) = setup();
    assert!(tracker.seen_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_then_read() {
    let (_, tracker) = setup();
    tracker.mark_seen_ids(&[id(1), id(2)]).await.unwrap();
    tracker.mark_seen_ids(&[id(3)]).await.unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![id(1), id(2), id(3)]);
}

#[tokio::test]
async fn mark_seen_uses_question_ids() {
    let (_, tracker) = setup();
    let options = [("A", "True"), ("B", "False")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let q = Question::new(QuestionKind::TrueFalse, "Bananas are berries", options, "A", "")
        .unwrap();

    tracker.mark_seen(std::slice::from_ref(&q)).await.unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![q.id]);
}

#[tokio::test]
async fn duplicates_collapse_to_newest_position() {
    let (_, tracker) = setup();
    tracker.mark_seen_ids(&[id(1), id(2)]).await.unwrap();
    tracker.mark_seen_ids(&[id(1)]).await.unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![id(2), id(1)]);
}

#[tokio::test]
async fn empty_ids_are_skipped() {
    let (_, tracker) = setup();
    tracker
        .mark_seen_ids(&[String::new(), id(1)])
        .await
        .unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![id(1)]);
}

#[tokio::test]
async fn capped_to_most_recent_200() {
    let (_, tracker) = setup();
    let all: Vec<String> = (0..250).map(id).collect();
    for chunk in all.chunks(10) {
        tracker.mark_seen_ids(chunk).await.unwrap();
    }

    let seen = tracker.seen_ids().await.unwrap();
    assert_eq!(seen.len(), MAX_SEEN_IDS);
    assert_eq!(seen, all[50..].to_vec());
}

#[tokio::test]
async fn single_large_batch_is_capped() {
    let (_, tracker) = setup();
    let all: Vec<String> = (0..250).map(id).collect();
    tracker.mark_seen_ids(&all).await.unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), all[50..].to_vec());
}

#[tokio::test]
async fn stale_record_reads_empty_and_is_deleted() {
    let (store, tracker) = setup();
    tracker
        .restore(&SeenRecord {
            ids: vec![id(1), id(2)],
            timestamp: unix_millis() - 25 * 3_600_000,
        })
        .await
        .unwrap();

    assert!(tracker.seen_ids().await.unwrap().is_empty());
    assert!(store.get(Table::SeenQuestions, "seen").await.unwrap().is_none());
}

#[tokio::test]
async fn record_within_window_is_kept() {
    let (_, tracker) = setup();
    tracker
        .restore(&SeenRecord {
            ids: vec![id(1)],
            timestamp: unix_millis() - 23 * 3_600_000,
        })
        .await
        .unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![id(1)]);
}

#[tokio::test]
async fn marking_restamps_the_window() {
    let (store, tracker) = setup();
    tracker
        .restore(&SeenRecord {
            ids: vec![id(1)],
            timestamp: unix_millis() - 23 * 3_600_000,
        })
        .await
        .unwrap();

    let before = unix_millis();
    tracker.mark_seen_ids(&[id(2)]).await.unwrap();

    let raw = store.get(Table::SeenQuestions, "seen").await.unwrap().unwrap();
    let record: SeenRecord = serde_json::from_value(raw).unwrap();
    assert!(record.timestamp >= before);
    assert_eq!(record.ids, vec![id(1), id(2)]);
}

#[tokio::test]
async fn marking_after_expiry_starts_fresh() {
    let (_, tracker) = setup();
    tracker
        .restore(&SeenRecord {
            ids: vec![id(1)],
            timestamp: unix_millis() - 48 * 3_600_000,
        })
        .await
        .unwrap();

    tracker.mark_seen_ids(&[id(2)]).await.unwrap();
    assert_eq!(tracker.seen_ids().await.unwrap(), vec![id(2)]);
}

#[tokio::test]
async fn reset_forgets_everything() {
    let (_, tracker) = setup();
    tracker.mark_seen_ids(&[id(1)]).await.unwrap();
    tracker.reset().await.unwrap();
    assert!(tracker.seen_ids().await.unwrap().is_empty());
}
