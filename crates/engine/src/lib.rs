//! Async session runtime
//!
//! [`SessionStore`] runs one game session as a tokio actor:
//!
//! - Intents from any number of dispatchers and from the gravity timer share
//!   one bounded queue and are processed strictly in order.
//! - Every applied intent publishes a new [`GameSnapshot`](core::GameSnapshot)
//!   on a `watch` channel, with an increasing `seq`.
//! - Line clears emit [`VisualEffectBurst`](types::VisualEffectBurst)s on a
//!   `broadcast` channel; nothing waits on their consumers.
//! - Game over hands a record to the history repository in the background,
//!   with retries. Save outcomes arrive as [`SessionNotice`]s.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stackfall_engine::adapter::{MemoryHistory, MemorySettings};
//! use stackfall_engine::types::GameIntent;
//! use stackfall_engine::{SessionStore, StoreConfig};
//!
//! # async fn demo() -> Result<(), stackfall_engine::StoreError> {
//! let store = SessionStore::spawn(
//!     StoreConfig::default(),
//!     Arc::new(MemorySettings::default()),
//!     Arc::new(MemoryHistory::new()),
//! )?;
//!
//! let dispatched = store.dispatch(GameIntent::HardDrop).await?;
//! println!("score {}", dispatched.snapshot.score);
//!
//! store.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod store;
mod timer;

pub use stackfall_adapter as adapter;
pub use stackfall_core as core;
pub use stackfall_types as types;

pub use config::StoreConfig;
pub use store::{Dispatched, IntentSender, SessionNotice, SessionStore, StoreError};
