use std::path::Path;

use chrono::{DateTime, Utc};

pub mod avatar;
pub mod config;
pub mod publish;
pub mod telegram;
pub mod theme;

use avatar::AvatarRenderer;
use config::Config;
use publish::ProfilePhotos;

/// Rendered avatar, handed from the renderer to the publisher.
pub const AVATAR_PATH: &str = ".avatar.png";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Render(#[from] avatar::Error),

    #[error(transparent)]
    Publish(#[from] publish::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Renders the clock for `now` and makes it the account's profile photo.
pub async fn run<P>(config: &Config, account: &P, now: DateTime<Utc>, avatar_path: impl AsRef<Path>) -> Result<()>
where
    P: ProfilePhotos + Sync + ?Sized,
{
    let avatar_path = avatar_path.as_ref();

    let now = now.with_timezone(&config.timezone);
    let theme = theme::select_theme(&now);
    log::info!(
        "Local time is {} in {}, using the {} theme",
        now.format("%H:%M"),
        config.timezone,
        if theme == theme::LIGHT { "light" } else { "dark" }
    );

    AvatarRenderer::new(&config.font_file_path)?.render_to_file(&now, &theme, avatar_path)?;

    publish::publish(account, avatar_path).await?;

    Ok(())
}
