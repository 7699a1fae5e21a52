//! Local filesystem storage for uploaded post images.
//!
//! Stored names are `<unix-millis>.<ext>`; a `-<n>` suffix is added when a
//! name is already taken. Removal tolerates files that are already gone.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("invalid asset: {0}")]
    Invalid(String),

    #[error("asset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Invalid(msg) => AppError::BadRequest(msg),
            AssetError::Io(e) => AppError::Io(e),
        }
    }
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist an uploaded image and return the name it was stored under.
    async fn save(&self, original_name: &str, data: Bytes) -> Result<String, AssetError>;

    /// Remove a stored asset. `Ok(false)` when there was nothing to remove.
    async fn remove(&self, name: &str) -> Result<bool, AssetError>;
}

pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, AssetError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

/// Lower-cased extension of an upload, if it names an image type.
pub fn image_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    let mime = mime_guess::from_ext(&ext).first()?;
    (mime.type_() == mime_guess::mime::IMAGE).then_some(ext)
}

fn validate_name(name: &str) -> Result<(), AssetError> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(AssetError::Invalid(format!("bad asset name: {:?}", name)));
    }
    Ok(())
}

async fn write_contents(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await
}

fn candidate_name(stem: i64, attempt: u32, ext: &str) -> String {
    if attempt == 0 {
        format!("{}.{}", stem, ext)
    } else {
        format!("{}-{}.{}", stem, attempt, ext)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn save(&self, original_name: &str, data: Bytes) -> Result<String, AssetError> {
        let ext = image_extension(original_name).ok_or_else(|| {
            AssetError::Invalid(format!("{:?} is not a supported image", original_name))
        })?;

        fs::create_dir_all(&self.root).await?;

        let stem = chrono::Utc::now().timestamp_millis();
        let mut attempt = 0u32;
        loop {
            let name = candidate_name(stem, attempt, &ext);
            let path = self.root.join(&name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    if let Err(e) = write_contents(&mut file, &data).await {
                        drop(file);
                        if let Err(cleanup) = fs::remove_file(&path).await {
                            tracing::warn!(
                                "Failed to remove partial asset {}: {}",
                                path.display(),
                                cleanup
                            );
                        }
                        return Err(e.into());
                    }
                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn remove(&self, name: &str) -> Result<bool, AssetError> {
        let path = self.path_for(name)?;
        if !fs::try_exists(&path).await? {
            return Ok(false);
        }
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("Deleted asset: {}", path.display());
                Ok(true)
            }
            // Lost a race with another delete
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
