//! Code Studio bot - Telegram bot and mini app backend
//!
//! The binary (`codestudio`) wires [`codecore`] components into:
//! - `web`: the axum server behind the mini app, plus the Telegram webhook route
//! - `telegram`: bot construction, the reply keyboard and the update schema
//! - `cli`: command line interface

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod telegram;
pub mod web;

pub use telegram::{create_bot, schema, BotLink, HandlerError};
pub use web::{create_router, run_server, AppState};
