use anyhow::Result;
use std::env;

use chrono::Utc;
use clock_avatar::{config::Config, telegram::TelegramAccount, AVATAR_PATH};

const SESSION_FILE: &str = ".telegram_session";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path = env::var("CLOCK_AVATAR_CONFIG").unwrap_or("config.toml".to_string());
    let config = Config::load(&config_path)?;

    let account = TelegramAccount::connect(&config.telegram_account, SESSION_FILE).await?;

    clock_avatar::run(&config, &account, Utc::now(), AVATAR_PATH).await?;

    log::info!("Avatar updated");

    Ok(())
}
