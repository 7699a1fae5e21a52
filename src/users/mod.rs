pub mod repository;

pub use repository::{NewUser, SqliteUserRepository, UserRepository};
