use std::sync::Arc;

use anyhow::{Context, Result};
use codebot::cli::{Cli, Commands};
use codebot::telegram::{self, BotLink};
use codebot::web::{self, AppState};
use codecore::logging::log_configuration;
use codecore::{init_logger, Config, Pipeline, ProjectStore};
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use url::Url;

/// Main entry point for the Code Studio bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();
    let config = Config::from_env();

    init_logger(&config.log_file_path, config.log_level).context("Failed to initialize logger")?;
    log_configuration(&config);

    match cli.command.unwrap_or(Commands::Run { polling: false }) {
        Commands::Run { polling } => {
            log::info!("Running Code Studio (polling: {})", polling);
            run(config, polling).await
        }
        Commands::Generate { task, no_enhance } => generate_once(&config, &task, no_enhance).await,
    }
}

async fn generate_once(config: &Config, task: &str, no_enhance: bool) -> Result<()> {
    let mut pipeline = Pipeline::from_config(&config.completion).context("Failed to set up completion client")?;
    if no_enhance {
        pipeline = pipeline.with_enhancement(false);
    }

    let code = pipeline
        .run(task)
        .await
        .with_context(|| format!("Code generation failed for task: {}", task))?;
    println!("{}", code);
    Ok(())
}

async fn run(config: Config, polling: bool) -> Result<()> {
    let store = ProjectStore::open(&config.database_path).context("Failed to open project store")?;
    let pipeline = Pipeline::from_config(&config.completion).context("Failed to set up completion client")?;

    let link = match &config.telegram.bot_token {
        Some(token) => {
            let miniapp_url = config
                .telegram
                .miniapp_url()
                .context("MINIAPP_URL or APP_URL must be set when BOT_TOKEN is set")?;
            let miniapp_url = Url::parse(miniapp_url).context("Invalid mini app URL")?;
            let bot = telegram::create_bot(token, telegram::bot::REQUEST_TIMEOUT)?;
            Some(BotLink::new(bot, telegram::schema(miniapp_url)))
        }
        None => {
            log::warn!("BOT_TOKEN is not set, running the web server without the bot");
            None
        }
    };

    if polling {
        let link = link.clone().context("Polling mode requires BOT_TOKEN")?;
        link.bot.delete_webhook().await.context("Failed to remove webhook")?;
    } else if let Some(link) = &link {
        let url = config
            .telegram
            .webhook_url()
            .context("APP_URL must be set to register the webhook")?;
        let url = Url::parse(&url).context("Invalid APP_URL")?;
        let secret = config
            .telegram
            .webhook_secret
            .as_ref()
            .context("WEBHOOK_SECRET must be set in webhook mode")?;
        telegram::register_webhook(&link.bot, url, secret)
            .await
            .context("Failed to register webhook")?;
    }

    let state = AppState {
        pipeline,
        store,
        telegram: Arc::new(config.telegram),
        bot: link.clone(),
    };
    let router = web::create_router(state);

    match link.filter(|_| polling) {
        Some(link) => {
            let server = tokio::spawn(web::run_server(config.port, router));
            run_polling(link).await;
            server.abort();
            Ok(())
        }
        None => web::run_server(config.port, router).await,
    }
}

/// Long polling for local runs; the web server keeps serving the mini app.
async fn run_polling(link: BotLink) {
    log::info!("Starting bot in long polling mode");
    let listener = Polling::builder(link.bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(link.bot, link.handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
}
