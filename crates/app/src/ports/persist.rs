//! Persistence port: the key/value table behind `store` conditions.

use std::future::Future;

use luma_domain::error::LumaError;
use luma_domain::persist::PersistRecord;

/// Key/value persistence with optional expiry.
///
/// Expired records must behave as absent: `get` returns `None` for them
/// and `list` omits them. Physical removal is the job of
/// [`prune_expired`](Self::prune_expired), which the service calls
/// periodically.
pub trait PersistStore: Send + Sync {
    /// Fetch a live record by key.
    fn get(
        &self,
        unique: &str,
    ) -> impl Future<Output = Result<Option<PersistRecord>, LumaError>> + Send;

    /// Insert or replace a record.
    fn put(&self, record: PersistRecord)
    -> impl Future<Output = Result<(), LumaError>> + Send;

    /// Remove a record by key. Removing a missing key is not an error.
    fn delete(&self, unique: &str) -> impl Future<Output = Result<(), LumaError>> + Send;

    /// All live records.
    fn list(&self) -> impl Future<Output = Result<Vec<PersistRecord>, LumaError>> + Send;

    /// Physically remove expired rows, returning how many went away.
    fn prune_expired(&self) -> impl Future<Output = Result<u64, LumaError>> + Send;
}
