//! Session store - single-writer actor over a game session
//!
//! One task owns the [`GameState`]. Dispatchers and the gravity timer feed a
//! bounded queue; each intent is processed to completion (including any
//! chained lock, clear and spawn) before the next one is read. Observers get
//! immutable snapshots through a `watch` channel and effect bursts and notices
//! through `broadcast` channels.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use crate::adapter::{
    current_timestamp_ms, record_from_snapshot, save_with_retry, HistoryRepository, SavePolicy,
    SettingsRepository,
};
use crate::config::StoreConfig;
use crate::core::{
    CoreError, GameConfig, GameSnapshot, GameState, GravityPlan, IntentOutcome, TimerDirective,
    Transition,
};
use crate::timer::spawn_timer;
use crate::types::{GameIntent, GameRecord, GameSettings, VisualEffectBurst};

const EFFECT_CAPACITY: usize = 64;
const NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session store is closed")]
    Closed,
    #[error("intent queue is full")]
    Full,
    #[error("session faulted: {0}")]
    Faulted(#[from] CoreError),
}

/// Result of a processed intent
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub outcome: IntentOutcome,
    /// Snapshot after the intent; unchanged unless `outcome` is `Applied`
    pub snapshot: Arc<GameSnapshot>,
}

/// Out-of-band session events
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    GameOver { episode_id: u32, score: u64 },
    RecordSaved(GameRecord),
    RecordSaveFailed { record: GameRecord, error: String },
    /// The session hit an internal error and stopped; only restart is accepted
    SessionFailed { reason: String },
    /// Settings changed mid-session; they take effect on the next restart
    SettingsDeferred,
}

type Reply = oneshot::Sender<Result<Dispatched, StoreError>>;

pub(crate) enum Command {
    Intent {
        intent: GameIntent,
        reply: Option<Reply>,
    },
    Tick {
        epoch: u64,
    },
    Shutdown,
}

/// Cloneable handle for feeding intents into a store
#[derive(Clone)]
pub struct IntentSender {
    tx: mpsc::Sender<Command>,
}

impl IntentSender {
    /// Queue an intent and wait for it to be processed
    pub async fn dispatch(&self, intent: GameIntent) -> Result<Dispatched, StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Intent {
                intent,
                reply: Some(reply),
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)?
    }

    /// Queue an intent without waiting; fails with `Full` instead of blocking
    pub fn try_dispatch(&self, intent: GameIntent) -> Result<(), StoreError> {
        self.tx
            .try_send(Command::Intent {
                intent,
                reply: None,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => StoreError::Full,
                mpsc::error::TrySendError::Closed(_) => StoreError::Closed,
            })
    }
}

/// Owner-side handle of a running session
pub struct SessionStore {
    sender: IntentSender,
    snapshots: watch::Receiver<Arc<GameSnapshot>>,
    effects: broadcast::Sender<Arc<VisualEffectBurst>>,
    notices: broadcast::Sender<SessionNotice>,
    actor: JoinHandle<()>,
}

impl SessionStore {
    /// Start a session. Must be called within a tokio runtime.
    ///
    /// Reads the current settings for the first episode.
    pub fn spawn(
        config: StoreConfig,
        settings: Arc<dyn SettingsRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Result<Self, StoreError> {
        let game_config = GameConfig::from_settings(&settings.get())?;
        let state = GameState::new(game_config, config.seed)?;
        Ok(Self::spawn_with_state(config, state, settings, history))
    }

    /// Start a session around an existing state
    pub(crate) fn spawn_with_state(
        config: StoreConfig,
        state: GameState,
        settings: Arc<dyn SettingsRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        let settings_rx = settings.observe();
        let (tx, rx) = mpsc::channel(config.max_pending_intents.max(1));
        let (snapshot_tx, snapshots) = watch::channel(Arc::new(state.snapshot(0)));
        let (effects, _) = broadcast::channel(EFFECT_CAPACITY);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let (timer_tx, timer_rx) = watch::channel(TimerDirective::Suspended);
        let timer = spawn_timer(timer_rx, tx.downgrade());

        tracing::info!(
            seed = config.seed,
            difficulty = state.config().difficulty.as_str(),
            width = state.config().board_width,
            height = state.config().board_height,
            "session started"
        );

        let mut session = Session {
            state,
            seq: 0,
            plan: GravityPlan::new(),
            last_instant: Instant::now(),
            snapshot_tx,
            effect_tx: effects.clone(),
            notice_tx: notices.clone(),
            timer_tx,
            timer,
            settings,
            history,
            save_policy: config.save_policy,
            saves: JoinSet::new(),
        };
        session.refresh_timer(true);

        let actor = tokio::spawn(session.run(rx, settings_rx));

        Self {
            sender: IntentSender { tx },
            snapshots,
            effects,
            notices,
            actor,
        }
    }

    pub fn sender(&self) -> IntentSender {
        self.sender.clone()
    }

    pub async fn dispatch(&self, intent: GameIntent) -> Result<Dispatched, StoreError> {
        self.sender.dispatch(intent).await
    }

    pub fn try_dispatch(&self, intent: GameIntent) -> Result<(), StoreError> {
        self.sender.try_dispatch(intent)
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<GameSnapshot>> {
        self.snapshots.clone()
    }

    pub fn effects(&self) -> broadcast::Receiver<Arc<VisualEffectBurst>> {
        self.effects.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Stop the actor and the timer, then wait for pending record saves
    pub async fn shutdown(self) -> Result<(), StoreError> {
        // A closed queue means the actor is already gone; joining still works.
        let _ = self.sender.tx.send(Command::Shutdown).await;
        self.actor.await.map_err(|e| {
            tracing::error!(error = %e, "session actor did not exit cleanly");
            StoreError::Closed
        })
    }
}

/// Actor-side state
struct Session {
    state: GameState,
    seq: u64,
    plan: GravityPlan,
    last_instant: Instant,
    snapshot_tx: watch::Sender<Arc<GameSnapshot>>,
    effect_tx: broadcast::Sender<Arc<VisualEffectBurst>>,
    notice_tx: broadcast::Sender<SessionNotice>,
    timer_tx: watch::Sender<TimerDirective>,
    timer: JoinHandle<()>,
    settings: Arc<dyn SettingsRepository>,
    history: Arc<dyn HistoryRepository>,
    save_policy: SavePolicy,
    saves: JoinSet<()>,
}

impl Session {
    async fn run(
        mut self,
        mut rx: mpsc::Receiver<Command>,
        mut settings_rx: watch::Receiver<GameSettings>,
    ) {
        let mut settings_open = true;

        loop {
            tokio::select! {
                biased;

                command = rx.recv() => match command {
                    Some(Command::Intent { intent, reply }) => {
                        let result = self.process(intent);
                        if let Some(reply) = reply {
                            let _ = reply.send(result);
                        }
                    }
                    Some(Command::Tick { epoch }) => self.process_tick(epoch),
                    Some(Command::Shutdown) | None => break,
                },

                changed = settings_rx.changed(), if settings_open => {
                    if changed.is_err() {
                        settings_open = false;
                        continue;
                    }
                    settings_rx.borrow_and_update();
                    tracing::debug!(
                        episode_id = self.state.episode_id(),
                        "settings changed mid-session; deferred until restart"
                    );
                    let _ = self.notice_tx.send(SessionNotice::SettingsDeferred);
                }

                Some(joined) = self.saves.join_next(), if !self.saves.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "record save task failed");
                    }
                }
            }
        }

        self.timer.abort();
        while let Some(joined) = self.saves.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "record save task failed");
            }
        }
        tracing::info!(episode_id = self.state.episode_id(), "session stopped");
    }

    fn process_tick(&mut self, epoch: u64) {
        let current = matches!(
            self.plan.current(),
            TimerDirective::Armed { epoch: armed, .. } if armed == epoch
        );
        if !current {
            tracing::trace!(epoch, "dropping stale gravity tick");
            return;
        }
        let _ = self.process(GameIntent::TickElapsed);
    }

    fn process(&mut self, intent: GameIntent) -> Result<Dispatched, StoreError> {
        let now = Instant::now();
        self.state.advance_time(now - self.last_instant);
        self.last_instant = now;

        let result = match intent {
            GameIntent::Restart => self.restart(),
            _ => self.state.apply(intent),
        };

        let transition = match result {
            Ok(transition) => transition,
            Err(e) => {
                self.fault(&e);
                return Err(StoreError::Faulted(e));
            }
        };

        match transition.outcome {
            IntentOutcome::Applied => self.publish(),
            IntentOutcome::Ignored => {}
            IntentOutcome::Rejected(reason) => {
                tracing::debug!(intent = intent.as_str(), ?reason, "intent rejected");
            }
        }

        self.finish(&transition);

        let rearm = transition.changed() && matches!(intent, GameIntent::Resume | GameIntent::Restart);
        self.refresh_timer(rearm);

        Ok(Dispatched {
            outcome: transition.outcome,
            snapshot: self.snapshot_tx.borrow().clone(),
        })
    }

    /// Start a new episode with the latest settings
    fn restart(&mut self) -> Result<Transition, CoreError> {
        let settings = self.settings.get();
        let config = match GameConfig::from_settings(&settings) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid settings on restart");
                self.state.config().clone()
            }
        };
        self.state.restart(config)?;
        tracing::info!(
            episode_id = self.state.episode_id(),
            seed = self.state.seed(),
            difficulty = self.state.config().difficulty.as_str(),
            "session restarted"
        );
        Ok(Transition {
            outcome: IntentOutcome::Applied,
            lock: None,
            effect: None,
            entered_game_over: false,
        })
    }

    /// Emit effects and hand off the record for a finished game
    fn finish(&mut self, transition: &Transition) {
        if let Some(effect) = &transition.effect {
            let _ = self.effect_tx.send(Arc::new(effect.clone()));
        }

        if !transition.entered_game_over {
            return;
        }

        let snapshot = self.snapshot_tx.borrow().clone();
        tracing::info!(
            episode_id = snapshot.episode_id,
            score = snapshot.score,
            lines = snapshot.lines_cleared,
            level = snapshot.level,
            "game over"
        );
        let _ = self.notice_tx.send(SessionNotice::GameOver {
            episode_id: snapshot.episode_id,
            score: snapshot.score,
        });

        let record = record_from_snapshot(&snapshot, current_timestamp_ms());
        let history = Arc::clone(&self.history);
        let policy = self.save_policy;
        let notices = self.notice_tx.clone();
        self.saves.spawn(async move {
            match save_with_retry(history, record.clone(), policy).await {
                Ok(attempts) => {
                    tracing::info!(record_id = record.id, score = record.score, attempts, "game record saved");
                    let _ = notices.send(SessionNotice::RecordSaved(record));
                }
                Err(e) => {
                    tracing::warn!(record_id = record.id, error = %e, "giving up on game record");
                    let _ = notices.send(SessionNotice::RecordSaveFailed {
                        record,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    /// End the session after an invariant violation. No record is saved.
    fn fault(&mut self, error: &CoreError) {
        tracing::error!(
            episode_id = self.state.episode_id(),
            piece_id = self.state.piece_id(),
            error = %error,
            "session faulted"
        );
        self.state.fail();
        self.publish();
        let _ = self.notice_tx.send(SessionNotice::SessionFailed {
            reason: error.to_string(),
        });
        self.refresh_timer(false);
    }

    fn publish(&mut self) {
        self.seq += 1;
        let snapshot = Arc::new(self.state.snapshot(self.seq));
        self.snapshot_tx.send_replace(snapshot);
    }

    fn refresh_timer(&mut self, rearm: bool) {
        let interval = self.state.gravity_interval();
        if let Some(directive) = self.plan.update(self.state.phase(), interval, rearm) {
            self.timer_tx.send_replace(directive);
        }
    }
}
