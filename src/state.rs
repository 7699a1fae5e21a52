use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::posts::lifecycle::PostLifecycle;
use crate::posts::repository::{PostRepository, SqlitePostRepository};
use crate::posts::uploads::{AssetStore, LocalAssetStore};
use crate::users::repository::{SqliteUserRepository, UserRepository};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    /// Wire the SQLite stores and the local upload directory around one pool.
    pub fn new(db: DbPool, config: Config) -> Self {
        let posts: Arc<dyn PostRepository> = Arc::new(SqlitePostRepository::new(db.clone()));
        let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db.clone()));
        let assets: Arc<dyn AssetStore> = Arc::new(LocalAssetStore::new(config.uploads_path()));
        Self {
            db,
            config,
            posts,
            users,
            assets,
        }
    }

    pub fn lifecycle(&self) -> PostLifecycle {
        PostLifecycle::new(self.posts.clone(), self.assets.clone())
    }
}
