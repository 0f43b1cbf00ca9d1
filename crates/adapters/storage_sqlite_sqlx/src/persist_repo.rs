//! `SQLite` implementation of [`PersistStore`].
//!
//! Values are stored as JSON text, timestamps as RFC 3339 text with a
//! fixed precision so that string comparison in SQL matches temporal
//! order. Expired rows are hidden by every read and physically removed by
//! [`PersistStore::prune_expired`].

use std::future::Future;

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use luma_app::ports::PersistStore;
use luma_domain::error::LumaError;
use luma_domain::persist::PersistRecord;
use luma_domain::time::Timestamp;

use crate::error::StorageError;

fn encode_time(value: Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&chrono::Utc))
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Wrapper for converting database rows into domain [`PersistRecord`].
struct Wrapper(PersistRecord);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<PersistRecord> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let unique: String = row.try_get("unique")?;
        let value: String = row.try_get("value")?;
        let expire: Option<String> = row.try_get("expire")?;
        let about: Option<String> = row.try_get("about")?;
        let updated: String = row.try_get("updated")?;

        let value =
            serde_json::from_str(&value).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let expire = expire.as_deref().map(decode_time).transpose()?;
        let updated = decode_time(&updated)?;

        Ok(Self(PersistRecord {
            unique,
            value,
            expire,
            about,
            updated,
        }))
    }
}

const UPSERT: &str = "INSERT INTO persist (\"unique\", value, expire, about, updated) \
     VALUES (?, ?, ?, ?, ?) \
     ON CONFLICT(\"unique\") DO UPDATE SET \
     value = excluded.value, expire = excluded.expire, \
     about = excluded.about, updated = excluded.updated";
const SELECT_LIVE_BY_KEY: &str =
    "SELECT * FROM persist WHERE \"unique\" = ? AND (expire IS NULL OR expire > ?)";
const SELECT_LIVE: &str =
    "SELECT * FROM persist WHERE expire IS NULL OR expire > ? ORDER BY \"unique\"";
const DELETE_BY_KEY: &str = "DELETE FROM persist WHERE \"unique\" = ?";
const DELETE_EXPIRED: &str = "DELETE FROM persist WHERE expire IS NOT NULL AND expire <= ?";

/// `SQLite`-backed persistence table.
pub struct SqlitePersistStore {
    pool: SqlitePool,
}

impl SqlitePersistStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PersistStore for SqlitePersistStore {
    fn get(
        &self,
        unique: &str,
    ) -> impl Future<Output = Result<Option<PersistRecord>, LumaError>> + Send {
        let pool = self.pool.clone();
        let unique = unique.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_LIVE_BY_KEY)
                .bind(&unique)
                .bind(encode_time(luma_domain::time::now()))
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn put(&self, record: PersistRecord) -> impl Future<Output = Result<(), LumaError>> + Send {
        let pool = self.pool.clone();
        async move {
            let value = serde_json::to_string(&record.value).map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(&record.unique)
                .bind(value)
                .bind(record.expire.map(encode_time))
                .bind(&record.about)
                .bind(encode_time(record.updated))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn delete(&self, unique: &str) -> impl Future<Output = Result<(), LumaError>> + Send {
        let pool = self.pool.clone();
        let unique = unique.to_string();
        async move {
            sqlx::query(DELETE_BY_KEY)
                .bind(&unique)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<PersistRecord>, LumaError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_LIVE)
                .bind(encode_time(luma_domain::time::now()))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn prune_expired(&self) -> impl Future<Output = Result<u64, LumaError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_EXPIRED)
                .bind(encode_time(luma_domain::time::now()))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected())
        }
    }
}
