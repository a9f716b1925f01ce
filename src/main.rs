//! Headless Stackfall runner (default binary).
//!
//! `stackfall play` autoplays one session against the configured storage and
//! prints the result; `stackfall history` lists stored records. Storage and
//! store settings come from `STACKFALL_*` environment variables, log filtering
//! from `RUST_LOG`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use stackfall::adapter::{
    open_history, open_settings, HistoryRepository, MemorySettings, RecordFilter, StorageConfig,
};
use stackfall::autoplay::plan_snapshot;
use stackfall::cli::{parse_args, CliArgs, Mode};
use stackfall::engine::{SessionNotice, SessionStore, StoreConfig};
use stackfall::types::{GameIntent, VisualEffectEvent};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackfall=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    let storage = StorageConfig::from_env();
    let history = open_history(&storage).context("failed to open game history")?;

    match cli.mode {
        Mode::Play => play(&cli, &storage, history).await,
        Mode::History => print_history(&cli, history.as_ref()),
    }
}

async fn play(cli: &CliArgs, storage: &StorageConfig, history: Arc<dyn HistoryRepository>) -> Result<()> {
    let mut settings = open_settings(storage).context("failed to load settings")?;
    if let Some(difficulty) = cli.difficulty {
        // A command line override must not be written back to the settings file.
        let mut overridden = settings.get();
        overridden.difficulty = difficulty;
        settings = Arc::new(MemorySettings::new(overridden));
    }

    let mut config = StoreConfig::from_env();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let store = SessionStore::spawn(config, settings, history).context("failed to start session")?;
    let effects = tokio::spawn(print_effects(store.effects()));
    let mut notices = store.notices();

    let mut placed = 0;
    while placed < cli.pieces {
        let snapshot = store.snapshot();
        if snapshot.is_game_over {
            break;
        }
        let intents = match plan_snapshot(&snapshot) {
            Ok(intents) => intents,
            Err(e) => {
                tracing::debug!(reason = e.message(), "no placement planned; hard dropping");
                vec![GameIntent::HardDrop]
            }
        };
        for intent in intents {
            store.dispatch(intent).await.context("session store stopped")?;
        }
        placed += 1;
    }

    // Unfinished games are not recorded.
    let last = store.snapshot();
    store.shutdown().await?;
    let _ = effects.await;

    println!(
        "pieces {}  score {}  lines {}  level {}  time {:.1}s{}",
        placed,
        last.score,
        last.lines_cleared,
        last.level,
        last.elapsed_ms as f64 / 1000.0,
        if last.is_game_over { "  (game over)" } else { "" }
    );

    while let Ok(notice) = notices.try_recv() {
        match notice {
            SessionNotice::RecordSaved(record) => println!("saved record {:016x}", record.id),
            SessionNotice::RecordSaveFailed { error, .. } => eprintln!("record not saved: {}", error),
            SessionNotice::SessionFailed { reason } => eprintln!("session failed: {}", reason),
            SessionNotice::GameOver { .. } | SessionNotice::SettingsDeferred => {}
        }
    }
    Ok(())
}

async fn print_effects(mut effects: broadcast::Receiver<Arc<stackfall::types::VisualEffectBurst>>) {
    loop {
        match effects.recv().await {
            Ok(burst) => {
                for event in &burst.events {
                    if let VisualEffectEvent::FloatingText { text, points, .. } = event {
                        println!("  {} +{}", text, points);
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "effect printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

fn print_history(cli: &CliArgs, history: &dyn HistoryRepository) -> Result<()> {
    let filter = RecordFilter {
        difficulty: cli.difficulty,
        ..RecordFilter::top_scores(10)
    };
    let records = history.list(&filter).context("failed to read game history")?;
    if records.is_empty() {
        println!("no games recorded");
        return Ok(());
    }
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{:>2}. {:>8}  lines {:>4}  level {:>3}  {:<6}  {:.1}s",
            rank + 1,
            record.score,
            record.lines_cleared,
            record.level,
            record.difficulty.as_str(),
            record.duration_ms as f64 / 1000.0
        );
    }
    Ok(())
}
