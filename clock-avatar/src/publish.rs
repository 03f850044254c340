use std::path::Path;

use async_trait::async_trait;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Remote call {operation} failed: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn network(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Error::Network {
            operation,
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Identity of a remote profile photo, as needed to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePhoto {
    pub id: i64,
    pub access_hash: i64,
    pub file_reference: Vec<u8>,
}

#[async_trait]
pub trait ProfilePhotos {
    /// Photos of the signed-in account in the order the remote returns them.
    async fn list_photos(&self) -> Result<Vec<ProfilePhoto>>;

    async fn delete_photo(&self, photo: &ProfilePhoto) -> Result<()>;

    async fn set_photo(&self, image_path: &Path) -> Result<()>;
}

/// Prunes every profile photo but the first one listed, then uploads `image_path`.
///
/// The first listed photo is taken to be the active one. Errors are returned as
/// soon as they happen; deletions already made are not undone.
pub async fn publish<P>(account: &P, image_path: &Path) -> Result<()>
where
    P: ProfilePhotos + Sync + ?Sized,
{
    let photos = account.list_photos().await?;
    log::info!("Found {} existing profile photos", photos.len());

    let stale = photos.get(1..).unwrap_or_default();
    for photo in stale {
        log::debug!("Deleting profile photo {}", photo.id);
        account.delete_photo(photo).await?;
    }
    log::info!("Deleted {} profile photos", stale.len());

    account.set_photo(image_path).await?;
    log::info!("Uploaded {}", image_path.display());

    Ok(())
}
