//! # luma-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`luma_app::ports::PersistStore`] port
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain records and database rows
//!
//! ## Dependency rule
//! Depends on `luma-app` (for the port trait) and `luma-domain` (for domain
//! types). The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod persist_repo;
pub mod pool;

pub use error::StorageError;
pub use persist_repo::SqlitePersistStore;
pub use pool::{Config, Database};
