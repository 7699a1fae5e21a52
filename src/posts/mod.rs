pub mod lifecycle;
pub mod repository;
pub mod uploads;

pub use lifecycle::{can_delete, PostBody, PostLifecycle, PostSubmission};
pub use repository::{NewPost, PostRepository, SqlitePostRepository};
pub use uploads::{AssetError, AssetStore, LocalAssetStore};
