//! Integration tests for the durable store backends and the rounds table.

use std::sync::Arc;

use serde_json::json;
use trivia_supply::{
    DurableStore, FileStore, GameRounds, MemoryStore, Question, QuestionKind, SupplyError, Table,
};

fn question(text: &str) -> Question {
    let options = [("A", "More"), ("B", "Less")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Question::new(QuestionKind::MoreLess, text, options, "B", "").unwrap()
}

/// Behaviour every backend must share.
async fn exercise_store(store: &dyn DurableStore) {
    assert!(store.get(Table::QuestionPool, "k").await.unwrap().is_none());

    store
        .put(Table::QuestionPool, "k", json!({"n": 1}))
        .await
        .unwrap();
    store
        .put(Table::QuestionPool, "k", json!({"n": 2}))
        .await
        .unwrap();
    assert_eq!(
        store.get(Table::QuestionPool, "k").await.unwrap(),
        Some(json!({"n": 2}))
    );

    // Tables are separate namespaces.
    assert!(store.get(Table::GameQuestions, "k").await.unwrap().is_none());

    store
        .put(Table::QuestionPool, "other", json!(true))
        .await
        .unwrap();
    let mut keys = store.keys(Table::QuestionPool).await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["k".to_string(), "other".to_string()]);

    assert!(store.delete(Table::QuestionPool, "k").await.unwrap());
    assert!(!store.delete(Table::QuestionPool, "k").await.unwrap());

    store.clear(Table::QuestionPool).await.unwrap();
    assert!(store.keys(Table::QuestionPool).await.unwrap().is_empty());
    // Clearing an empty table is fine.
    store.clear(Table::SeenQuestions).await.unwrap();
}

// =========================================================================
// Backends
// =========================================================================

#[tokio::test]
async fn memory_store_contract() {
    let store = MemoryStore::new();
    exercise_store(&store).await;
    assert_eq!(store.name(), "memory");
}

#[tokio::test]
async fn file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    exercise_store(&store).await;
    assert_eq!(store.name(), "file");
}

#[tokio::test]
async fn file_store_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FileStore::open(&nested).unwrap();
    store.put(Table::SeenQuestions, "seen", json!([])).await.unwrap();
    assert!(nested.join("seen_questions.json").exists());
    assert_eq!(store.dir(), nested.as_path());
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store
            .put(Table::QuestionPool, "Science||Hard", json!({"questions": []}))
            .await
            .unwrap();
    }

    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(
        reopened
            .get(Table::QuestionPool, "Science||Hard")
            .await
            .unwrap(),
        Some(json!({"questions": []}))
    );
}

#[tokio::test]
async fn file_store_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    for n in 0..5 {
        store
            .put(Table::GameQuestions, &n.to_string(), json!(n))
            .await
            .unwrap();
    }

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["game_questions.json".to_string()]);
}

#[tokio::test]
async fn corrupt_table_file_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("question_pool.json"), "{ truncated").unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let err = store.get(Table::QuestionPool, "k").await.unwrap_err();
    assert!(matches!(err, SupplyError::StorageUnavailable(_)));
    assert!(err.is_user_visible());

    // Other tables are unaffected.
    assert!(store.get(Table::GameQuestions, "1").await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_writes_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());

    let mut handles = Vec::new();
    for n in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .put(Table::QuestionPool, &format!("k{n}"), json!(n))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.keys(Table::QuestionPool).await.unwrap().len(), 20);
}

// =========================================================================
// GameRounds
// =========================================================================

#[tokio::test]
async fn rounds_are_one_based_and_ordered() {
    let rounds = GameRounds::new(Arc::new(MemoryStore::new()));
    let questions: Vec<Question> = (1..=12).map(|n| question(&format!("q{n}"))).collect();
    rounds.write(&questions).await.unwrap();

    assert!(rounds.round(0).await.unwrap().is_none());
    assert_eq!(rounds.round(1).await.unwrap(), Some(questions[0].clone()));
    assert_eq!(rounds.round(12).await.unwrap(), Some(questions[11].clone()));

    // Numeric, not lexicographic, order.
    let all = rounds.all().await.unwrap();
    let numbers: Vec<usize> = all.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn clear_drops_all_rounds() {
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    let rounds = GameRounds::new(Arc::clone(&store));
    rounds.write(&[question("a"), question("b")]).await.unwrap();
    store
        .put(Table::QuestionPool, "keep", json!(1))
        .await
        .unwrap();

    rounds.clear().await.unwrap();

    assert!(rounds.all().await.unwrap().is_empty());
    assert!(store.get(Table::QuestionPool, "keep").await.unwrap().is_some());
}

#[tokio::test]
async fn rounds_persist_in_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let q = question("persisted");
    {
        let rounds = GameRounds::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        rounds.write(std::slice::from_ref(&q)).await.unwrap();
    }
    let rounds = GameRounds::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    assert_eq!(rounds.round(1).await.unwrap(), Some(q));
}
