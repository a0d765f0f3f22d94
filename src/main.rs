use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use teloxide::{prelude::*, utils::command::BotCommands};
use tokio::time;

mod config;
mod course;
mod handlers;
mod models;
mod storage;
mod transport;

use crate::config::{Config, StorageBackend};
use crate::course::{run_delivery_worker, CourseEngine, DelayQueue, LessonCatalog};
use crate::handlers::{command_handler, message_handler};
use crate::storage::{Database, MemoryStore, ProgressStore, ResponseLog, SheetsStore};
use crate::transport::TelegramTransport;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать курс заново")]
    Start,
    #[command(description = "поставить курс на паузу")]
    Pause,
    #[command(description = "продолжить курс")]
    Resume,
    #[command(description = "показать помощь")]
    Help,
}

type Storage = (Arc<dyn ProgressStore>, Arc<dyn ResponseLog>);

async fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    match config.backend {
        StorageBackend::Sheets => {
            let store = Arc::new(
                SheetsStore::connect(&config.sheets)
                    .await
                    .context("Google Sheets connection failed")?,
            );
            Ok((store.clone() as Arc<dyn ProgressStore>, store as Arc<dyn ResponseLog>))
        }
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().context("DATABASE_URL must be set")?;
            let db = Database::new(url).await?;
            db.init().await?;
            log::info!("✅ Database initialized");
            let db = Arc::new(db);
            Ok((db.clone() as Arc<dyn ProgressStore>, db as Arc<dyn ResponseLog>))
        }
        StorageBackend::Memory => {
            log::warn!("⚠️ In-memory storage: progress is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Ok((store.clone() as Arc<dyn ProgressStore>, store as Arc<dyn ResponseLog>))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting course bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}. Add it to the environment or the .env file", e);
            return Err(e.into());
        }
    };

    let catalog = match &config.lessons_file {
        Some(path) => LessonCatalog::from_file(path)?,
        None => LessonCatalog::bundled()?,
    };
    log::info!("📚 {} lessons loaded", catalog.len());

    let (store, responses) = open_storage(&config).await?;

    let bot = Bot::new(config.bot_token.clone());
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let (queue, deliveries) = DelayQueue::new();
    let engine = Arc::new(CourseEngine::new(
        catalog,
        store,
        responses,
        transport,
        Arc::new(queue),
    ));

    // Отложенная доставка уроков
    tokio::spawn(run_delivery_worker(engine.clone(), deliveries));

    // Очистка простаивающих мьютексов пользователей
    let engine_clone = engine.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            engine_clone.locks().cleanup().await;
        }
    });

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Could not register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Bot started...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Bot stopped");
    Ok(())
}
