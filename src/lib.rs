//! Stackfall (workspace facade crate).
//!
//! Re-exports the workspace crates under short names and hosts the pieces of
//! the headless runner that are worth testing outside `main`.

pub use stackfall_adapter as adapter;
pub use stackfall_core as core;
pub use stackfall_engine as engine;
pub use stackfall_types as types;

pub mod autoplay;
pub mod cli;
