//! Bot initialization and outgoing messages
//!
//! This module contains:
//! - Bot instance creation
//! - The "Open Code Studio" reply keyboard
//! - Uploading a project to the user's chat as a `.py` document
//! - Webhook registration

use std::time::Duration;

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, InputFile, KeyboardButton, KeyboardMarkup, WebAppInfo};
use url::Url;

pub const GREETING: &str = "💻 AI Code Studio\n\nJust open and start coding.";
pub const OPEN_STUDIO_BUTTON: &str = "🚀 Open Code Studio";

/// Bot API request timeout; must exceed the long polling timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Name used for documents whose project has no title
const FALLBACK_TITLE: &str = "project";

/// Creates a Bot instance with a bounded HTTP client
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to build the HTTP client
pub fn create_bot(token: &SecretString, timeout: Duration) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(timeout).build()?;
    Ok(Bot::with_client(token.expose_secret(), client))
}

/// Reply keyboard with a single button that opens the mini app.
pub fn open_studio_keyboard(miniapp_url: Url) -> KeyboardMarkup {
    let button = KeyboardButton::new(OPEN_STUDIO_BUTTON).request(ButtonRequest::WebApp(WebAppInfo { url: miniapp_url }));
    KeyboardMarkup::new(vec![vec![button]]).resize_keyboard()
}

/// Answers a chat with the greeting and the mini app keyboard.
pub async fn send_greeting(bot: &Bot, chat_id: ChatId, miniapp_url: Url) -> ResponseResult<()> {
    bot.send_message(chat_id, GREETING)
        .reply_markup(open_studio_keyboard(miniapp_url))
        .await?;
    Ok(())
}

fn display_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        FALLBACK_TITLE
    } else {
        trimmed
    }
}

/// `<title>.py`, with path separators replaced so Telegram shows a plain name.
pub fn document_file_name(title: &str) -> String {
    format!("{}.py", display_title(title).replace(['/', '\\'], "_"))
}

pub fn document_caption(title: &str) -> String {
    format!("📦 {}", display_title(title))
}

/// Uploads `code` to the user's private chat as a Python file.
pub async fn send_project_document(bot: &Bot, user_id: i64, title: &str, code: &str) -> ResponseResult<()> {
    let file = InputFile::memory(code.as_bytes().to_vec()).file_name(document_file_name(title));
    bot.send_document(ChatId(user_id), file)
        .caption(document_caption(title))
        .await?;
    log::info!("Sent project '{}' to chat {}", display_title(title), user_id);
    Ok(())
}

/// Points Telegram at `url`, dropping updates queued while the bot was down.
///
/// Telegram echoes `secret` back in the `X-Telegram-Bot-Api-Secret-Token`
/// header of every delivery.
pub async fn register_webhook(bot: &Bot, url: Url, secret: &SecretString) -> ResponseResult<()> {
    log::info!("Registering webhook at {}", url);
    bot.set_webhook(url)
        .secret_token(secret.expose_secret().to_string())
        .drop_pending_updates(true)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keyboard_has_single_web_app_button() {
        let url = Url::parse("https://studio.example.com/app").unwrap();
        let markup = serde_json::to_value(open_studio_keyboard(url)).unwrap();

        let rows = markup["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        let buttons = rows[0].as_array().unwrap();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0]["text"], OPEN_STUDIO_BUTTON);
        assert_eq!(buttons[0]["web_app"]["url"], "https://studio.example.com/app");
        assert_eq!(markup["resize_keyboard"], true);
    }

    #[test]
    fn test_document_naming() {
        assert_eq!(document_file_name("calc"), "calc.py");
        assert_eq!(document_file_name("  "), "project.py");
        assert_eq!(document_file_name("a/b"), "a_b.py");
        assert_eq!(document_caption("calc"), "📦 calc");
        assert_eq!(document_caption(""), "📦 project");
    }

    #[test]
    fn test_create_bot_keeps_token() {
        let token = SecretString::from("123:abc".to_string());
        let bot = create_bot(&token, Duration::from_secs(5)).unwrap();
        assert_eq!(bot.token(), "123:abc");
    }
}
