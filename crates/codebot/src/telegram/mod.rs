//! Telegram side of Code Studio
//!
//! - `bot`: bot construction, keyboard, document upload, webhook registration
//! - `schema`: the dptree handler tree shared by webhook and polling modes

pub mod bot;
pub mod schema;

use teloxide::dispatching::UpdateHandler;
use teloxide::Bot;

pub use bot::{create_bot, open_studio_keyboard, register_webhook, send_project_document};
pub use schema::{dispatch_update, schema};

/// Error type returned by update handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A configured bot together with the handler tree that answers its updates.
#[derive(Clone)]
pub struct BotLink {
    pub bot: Bot,
    pub handler: UpdateHandler<HandlerError>,
}

impl BotLink {
    pub fn new(bot: Bot, handler: UpdateHandler<HandlerError>) -> Self {
        Self { bot, handler }
    }
}
