//! Dispatcher schema
//!
//! The same handler tree serves long polling (through teloxide's
//! `Dispatcher`) and webhook deliveries (through [`dispatch_update`]).

use std::ops::ControlFlow;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use url::Url;

use super::bot::send_greeting;
use super::HandlerError;

/// Creates the handler tree for the bot.
///
/// Every incoming message, whatever its content, is answered with the
/// greeting and the keyboard that opens `miniapp_url`.
pub fn schema(miniapp_url: Url) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let miniapp_url = miniapp_url.clone();
        async move {
            log::info!("Message in chat {}, replying with studio keyboard", msg.chat.id);
            send_greeting(&bot, msg.chat.id, miniapp_url).await?;
            Ok(())
        }
    })
}

/// Runs one update through `handler`, logging instead of returning failures.
pub async fn dispatch_update(handler: &UpdateHandler<HandlerError>, bot: Bot, update: Update) {
    let update_id = update.id;
    match handler.dispatch(dptree::deps![bot, update]).await {
        ControlFlow::Break(Ok(())) => {}
        ControlFlow::Break(Err(e)) => log::error!("Handler failed for update {:?}: {}", update_id, e),
        ControlFlow::Continue(_) => log::debug!("Update {:?} not handled", update_id),
    }
}
