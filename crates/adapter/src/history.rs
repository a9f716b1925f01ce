//! Completed-game history
//!
//! Repositories are synchronous; callers on the async side wrap them in
//! `spawn_blocking`. Every successful save bumps a revision counter that
//! [`RecordFeed`] turns into a stream of refreshed listings.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::error::PersistError;
use crate::types::{Difficulty, GameRecord};

/// Storage for finished games. `save` is idempotent per record id.
pub trait HistoryRepository: Send + Sync {
    fn save(&self, record: &GameRecord) -> Result<(), PersistError>;

    fn list(&self, filter: &RecordFilter) -> Result<Vec<GameRecord>, PersistError>;

    /// Bumped after every save that added a record
    fn revisions(&self) -> watch::Receiver<u64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrder {
    #[default]
    Newest,
    HighestScore,
}

/// Query over stored records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub difficulty: Option<Difficulty>,
    pub min_score: Option<u64>,
    pub limit: Option<usize>,
    pub order: RecordOrder,
}

impl RecordFilter {
    pub fn top_scores(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            order: RecordOrder::HighestScore,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &GameRecord) -> bool {
        self.difficulty.map_or(true, |d| record.difficulty == d)
            && self.min_score.map_or(true, |min| record.score >= min)
    }

    /// Filter, order and truncate records given in insertion order
    pub fn apply(&self, records: impl IntoIterator<Item = GameRecord>) -> Vec<GameRecord> {
        let mut selected: Vec<GameRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        // Later insertions win ties.
        selected.reverse();
        match self.order {
            RecordOrder::Newest => selected.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms)),
            RecordOrder::HighestScore => selected.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| b.timestamp_ms.cmp(&a.timestamp_ms))
            }),
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// In-process history, lost on exit
#[derive(Debug)]
pub struct MemoryHistory {
    records: Mutex<Vec<GameRecord>>,
    revision: watch::Sender<u64>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            records: Mutex::new(Vec::new()),
            revision,
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryRepository for MemoryHistory {
    fn save(&self, record: &GameRecord) -> Result<(), PersistError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistError::Unavailable("history lock poisoned".to_string()))?;
        if records.iter().any(|r| r.id == record.id) {
            return Ok(());
        }
        records.push(record.clone());
        drop(records);
        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    fn list(&self, filter: &RecordFilter) -> Result<Vec<GameRecord>, PersistError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PersistError::Unavailable("history lock poisoned".to_string()))?;
        Ok(filter.apply(records.iter().cloned()))
    }

    fn revisions(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

/// Append-only JSON lines file, one record per line
#[derive(Debug)]
pub struct JsonLinesHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
    revision: watch::Sender<u64>,
}

impl JsonLinesHistory {
    /// Open (without creating) the history file at `path`, creating parent directories
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let (revision, _) = watch::channel(0);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            revision,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All readable records in file order, first occurrence of each id.
    ///
    /// Unparseable lines (e.g. a write torn by a crash) are skipped.
    fn read_all(&self) -> Result<Vec<GameRecord>, PersistError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GameRecord>(&line) {
                Ok(record) => {
                    if seen.insert(record.id) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line = index + 1, error = %e, "skipping malformed history line");
                }
            }
        }
        Ok(records)
    }
}

impl HistoryRepository for JsonLinesHistory {
    fn save(&self, record: &GameRecord) -> Result<(), PersistError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PersistError::Unavailable("history lock poisoned".to_string()))?;

        if self.read_all()?.iter().any(|r| r.id == record.id) {
            return Ok(());
        }

        // Terminate a torn trailing line so the new record starts cleanly.
        let torn = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|&b| b != b'\n'))
            .unwrap_or(false);
        let mut line = if torn { "\n".to_string() } else { String::new() };
        line.push_str(&serde_json::to_string(record)?);
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    fn list(&self, filter: &RecordFilter) -> Result<Vec<GameRecord>, PersistError> {
        Ok(filter.apply(self.read_all()?))
    }

    fn revisions(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

/// Reactive listing: yields the current records, then a fresh listing after
/// every change to the repository.
pub struct RecordFeed {
    repo: Arc<dyn HistoryRepository>,
    filter: RecordFilter,
    revisions: watch::Receiver<u64>,
    primed: bool,
}

impl RecordFeed {
    pub fn new(repo: Arc<dyn HistoryRepository>, filter: RecordFilter) -> Self {
        let revisions = repo.revisions();
        Self {
            repo,
            filter,
            revisions,
            primed: false,
        }
    }

    /// Next listing. Returns `None` once the repository stops publishing.
    pub async fn next(&mut self) -> Option<Result<Vec<GameRecord>, PersistError>> {
        if self.primed {
            self.revisions.changed().await.ok()?;
        } else {
            self.primed = true;
        }
        self.revisions.borrow_and_update();

        let repo = Arc::clone(&self.repo);
        let filter = self.filter.clone();
        let listing = tokio::task::spawn_blocking(move || repo.list(&filter))
            .await
            .unwrap_or_else(|e| Err(PersistError::Unavailable(e.to_string())));
        Some(listing)
    }
}
