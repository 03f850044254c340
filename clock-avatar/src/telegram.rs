use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use grammers_client::{session::Session, Client, Config, InitParams, SignInError};
use grammers_tl_types as tl;

use crate::{
    config::AccountConfig,
    publish::{Error, ProfilePhoto, ProfilePhotos, Result},
};

const PHOTOS_PAGE_SIZE: i32 = 100;

pub struct TelegramAccount {
    client: Client,
    session_path: PathBuf,
}

fn prompt(message: &str) -> Result<String> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

impl TelegramAccount {
    /// Opens the session stored at `session_path`, signing in interactively if it
    /// is new or has been revoked.
    pub async fn connect(account: &AccountConfig, session_path: impl AsRef<Path>) -> Result<Self> {
        let session_path = session_path.as_ref().to_path_buf();

        log::debug!("Connecting to Telegram with session {}", session_path.display());

        let client = Client::connect(Config {
            session: Session::load_file_or_create(&session_path)?,
            api_id: account.api_id,
            api_hash: account.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|err| Error::network("connect", err))?;

        let account = Self { client, session_path };
        account.ensure_authorized().await?;
        Ok(account)
    }

    async fn ensure_authorized(&self) -> Result<()> {
        let authorized = self
            .client
            .is_authorized()
            .await
            .map_err(|err| Error::network("authorization check", err))?;

        if authorized {
            return Ok(());
        }

        log::info!("Session is not authorized, signing in");

        let phone = prompt("Phone number (international format): ")?;
        let token = self
            .client
            .request_login_code(&phone)
            .await
            .map_err(|err| Error::Auth(err.to_string()))?;

        let code = prompt("Login code: ")?;
        match self.client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().unwrap_or("none").to_string();
                let password = prompt(&format!("Password (hint: {hint}): "))?;
                self.client
                    .check_password(password_token, password.as_bytes())
                    .await
                    .map_err(|err| Error::Auth(err.to_string()))?;
            }
            Err(err) => return Err(Error::Auth(err.to_string())),
        }

        self.client.session().save_to_file(&self.session_path)?;
        log::info!("Signed in, session saved to {}", self.session_path.display());

        Ok(())
    }
}

fn to_profile_photo(photo: tl::enums::Photo) -> Option<ProfilePhoto> {
    match photo {
        tl::enums::Photo::Photo(photo) => Some(ProfilePhoto {
            id: photo.id,
            access_hash: photo.access_hash,
            file_reference: photo.file_reference,
        }),
        tl::enums::Photo::Empty(_) => None,
    }
}

/// Accumulates `photos.getUserPhotos` pages. The offset counts every entry the
/// server returned, empty ones included, so pages never overlap.
#[derive(Default)]
struct PhotoPages {
    photos: Vec<ProfilePhoto>,
    fetched: usize,
}

impl PhotoPages {
    fn offset(&self) -> i32 {
        self.fetched as i32
    }

    /// Adds a page and reports whether another one should be requested.
    fn push(&mut self, page: Vec<tl::enums::Photo>, total: Option<usize>) -> bool {
        let fetched = page.len();
        self.fetched += fetched;
        self.photos.extend(page.into_iter().filter_map(to_profile_photo));

        matches!(total, Some(total) if fetched > 0 && self.fetched < total)
    }
}

#[async_trait]
impl ProfilePhotos for TelegramAccount {
    async fn list_photos(&self) -> Result<Vec<ProfilePhoto>> {
        let mut pages = PhotoPages::default();

        loop {
            let request = tl::functions::photos::GetUserPhotos {
                user_id: tl::enums::InputUser::UserSelf,
                offset: pages.offset(),
                max_id: 0,
                limit: PHOTOS_PAGE_SIZE,
            };

            let (page, total) = match self
                .client
                .invoke(&request)
                .await
                .map_err(|err| Error::network("list", err))?
            {
                tl::enums::photos::Photos::Photos(all) => (all.photos, None),
                tl::enums::photos::Photos::Slice(slice) => (slice.photos, Some(slice.count as usize)),
            };

            if !pages.push(page, total) {
                break;
            }
        }

        Ok(pages.photos)
    }

    async fn delete_photo(&self, photo: &ProfilePhoto) -> Result<()> {
        let request = tl::functions::photos::DeletePhotos {
            id: vec![tl::enums::InputPhoto::Photo(tl::types::InputPhoto {
                id: photo.id,
                access_hash: photo.access_hash,
                file_reference: photo.file_reference.clone(),
            })],
        };

        self.client
            .invoke(&request)
            .await
            .map_err(|err| Error::network("delete", err))?;
        Ok(())
    }

    async fn set_photo(&self, image_path: &Path) -> Result<()> {
        let uploaded = self
            .client
            .upload_file(image_path)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::Io(err),
                _ => Error::network("upload", err),
            })?;

        let request = tl::functions::photos::UploadProfilePhoto {
            fallback: false,
            bot: None,
            file: Some(uploaded.raw),
            video: None,
            video_start_ts: None,
            video_emoji_markup: None,
        };

        self.client
            .invoke(&request)
            .await
            .map_err(|err| Error::network("upload", err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_photo(id: i64) -> tl::enums::Photo {
        tl::enums::Photo::Photo(tl::types::Photo {
            has_stickers: false,
            id,
            access_hash: 7,
            file_reference: vec![1, 2, 3],
            date: 0,
            sizes: vec![],
            video_sizes: None,
            dc_id: 2,
        })
    }

    fn empty_photo(id: i64) -> tl::enums::Photo {
        tl::enums::Photo::Empty(tl::types::PhotoEmpty { id })
    }

    #[test]
    fn keeps_photo_identity() {
        let photo = raw_photo(42);

        assert_eq!(
            to_profile_photo(photo),
            Some(ProfilePhoto {
                id: 42,
                access_hash: 7,
                file_reference: vec![1, 2, 3],
            })
        );
    }

    #[test]
    fn skips_empty_photos() {
        assert_eq!(to_profile_photo(empty_photo(1)), None);
    }

    #[test]
    fn offset_counts_empty_entries() {
        let mut pages = PhotoPages::default();

        let more = pages.push(vec![raw_photo(1), empty_photo(2), raw_photo(3)], Some(5));

        assert!(more);
        assert_eq!(pages.offset(), 3);
        assert_eq!(pages.photos.len(), 2);

        let more = pages.push(vec![raw_photo(4), raw_photo(5)], Some(5));

        assert!(!more);
        let ids: Vec<i64> = pages.photos.iter().map(|photo| photo.id).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
    }

    #[test]
    fn stops_on_complete_or_empty_pages() {
        let mut pages = PhotoPages::default();
        assert!(!pages.push(vec![raw_photo(1)], None));

        let mut pages = PhotoPages::default();
        assert!(!pages.push(vec![], Some(10)));
    }
}
