//! Session store end to end: autoplay, persistence and observers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stackfall::adapter::{
    HistoryRepository, JsonLinesHistory, MemoryHistory, MemorySettings, RecordFeed, RecordFilter,
};
use stackfall::autoplay::plan_snapshot;
use stackfall::core::IntentOutcome;
use stackfall::engine::{SessionNotice, SessionStore, StoreConfig};
use stackfall::types::{GameIntent, GameSettings};

fn temp_history(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("stackfall-store-{}-{}", std::process::id(), name))
        .join("history.jsonl")
}

#[tokio::test(start_paused = true)]
async fn autoplay_publishes_effects_for_every_clear() {
    let settings = Arc::new(MemorySettings::default());
    let history = Arc::new(MemoryHistory::new());
    let store = SessionStore::spawn(StoreConfig::default(), settings, history).unwrap();
    let mut effects = store.effects();

    for _ in 0..60 {
        let snapshot = store.snapshot();
        if snapshot.is_game_over {
            break;
        }
        for intent in plan_snapshot(&snapshot).unwrap() {
            let dispatched = store.dispatch(intent).await.unwrap();
            assert_eq!(dispatched.outcome, IntentOutcome::Applied, "{:?}", intent);
        }
    }

    let last = store.snapshot();
    store.shutdown().await.unwrap();

    let mut bursts = Vec::new();
    while let Ok(burst) = effects.try_recv() {
        bursts.push(burst);
    }
    assert!(last.lines_cleared > 0, "autoplay should clear lines in 60 pieces");
    assert!(!bursts.is_empty());
    assert!(bursts.len() as u32 <= last.lines_cleared);
    assert!(bursts.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test(start_paused = true)]
async fn senders_share_one_ordered_stream() {
    let settings = Arc::new(MemorySettings::default());
    let history = Arc::new(MemoryHistory::new());
    let store = SessionStore::spawn(StoreConfig::default(), settings, history).unwrap();

    let mut tasks = Vec::new();
    for intent in [GameIntent::MoveLeft, GameIntent::MoveRight, GameIntent::RotateCw] {
        let sender = store.sender();
        tasks.push(tokio::spawn(async move {
            let mut seqs = Vec::new();
            for _ in 0..3 {
                let dispatched = sender.dispatch(intent).await.unwrap();
                seqs.push(dispatched.snapshot.seq);
            }
            seqs
        }));
    }

    for task in tasks {
        let seqs = task.await.unwrap();
        assert!(seqs.windows(2).all(|w| w[0] <= w[1]), "{:?}", seqs);
    }
    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn game_over_is_appended_to_json_lines_history() {
    let path = temp_history("game-over");
    let _ = std::fs::remove_file(&path);

    let history: Arc<dyn HistoryRepository> = Arc::new(JsonLinesHistory::open(&path).unwrap());
    let mut feed = RecordFeed::new(history.clone(), RecordFilter::default());
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    let settings = Arc::new(MemorySettings::new(GameSettings {
        board_width: 4,
        board_height: 4,
        ..GameSettings::default()
    }));
    let store = SessionStore::spawn(StoreConfig::default(), settings, history.clone()).unwrap();
    let mut notices = store.notices();

    let mut drops = 0;
    while !store.snapshot().is_game_over {
        store.dispatch(GameIntent::HardDrop).await.unwrap();
        drops += 1;
        assert!(drops < 500, "4x4 board never topped out");
    }
    let final_score = store.snapshot().score;

    let saved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match notices.recv().await {
                Ok(SessionNotice::RecordSaved(record)) => return record,
                Ok(_) => continue,
                Err(e) => panic!("notice stream ended: {}", e),
            }
        }
    })
    .await
    .expect("record should be saved");
    assert_eq!(saved.score, final_score);

    let listed = tokio::time::timeout(Duration::from_secs(5), feed.next())
        .await
        .expect("feed should refresh")
        .unwrap()
        .unwrap();
    assert_eq!(listed, vec![saved.clone()]);

    store.shutdown().await.unwrap();

    let reopened = JsonLinesHistory::open(&path).unwrap();
    assert_eq!(reopened.list(&RecordFilter::default()).unwrap(), vec![saved]);
    let _ = std::fs::remove_file(&path);
}
