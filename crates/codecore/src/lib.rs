//! Code Studio core - code generation pipeline and project storage
//!
//! This library holds everything the bot and the mini app backend share,
//! with no Telegram dependency.
//!
//! # Module Structure
//!
//! - `config`: Configuration built once at startup and passed into components
//! - `error`: Error taxonomy shared by the pipeline and the store
//! - `logging`: Logger initialization (console + file)
//! - `completion`: Remote completion client and the enhance-then-generate pipeline
//! - `store`: SQLite-backed project persistence

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod completion;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

// Re-export commonly used types for convenience
pub use completion::{CompletionBackend, HttpCompletionClient, Pipeline};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use store::{create_pool, DbPool, ProjectStore};
