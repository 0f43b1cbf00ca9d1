//! End-to-end smoke tests for the full lumad stack.
//!
//! Each test wires the complete application (in-memory `SQLite`, real
//! persist store, real service loops) and drives it through the stream bus.

use luma_adapter_storage_sqlite_sqlx::{Config, SqlitePersistStore};
use luma_app::children::Children;
use luma_app::service::{Service, ServiceOptions};
use luma_domain::persist::PersistRecord;

async fn store() -> SqlitePersistStore {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    SqlitePersistStore::new(db.pool().clone())
}

#[tokio::test(flavor = "multi_thread")]
async fn should_start_and_stop_cleanly_with_no_origins() {
    let service = Service::start(
        Children::default(),
        luma_app::ports::Origins::new(),
        store().await,
        ServiceOptions {
            refresh_interval: std::time::Duration::from_millis(10),
            tick_interval: std::time::Duration::from_millis(10),
            ..ServiceOptions::default()
        },
    )
    .expect("service should start");

    // let the loops run a few cycles against the empty origin set
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    tokio::time::timeout(std::time::Duration::from_secs(1), service.stop())
        .await
        .expect("stop should drain and join");
}

#[tokio::test(flavor = "multi_thread")]
async fn should_persist_across_service_restart() {
    use luma_app::ports::PersistStore;

    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let pool = db.pool().clone();

    let store = SqlitePersistStore::new(pool.clone());
    store
        .put(PersistRecord::new("mode", "evening"))
        .await
        .expect("write should succeed");

    let service = Service::start(
        Children::default(),
        luma_app::ports::Origins::new(),
        store,
        ServiceOptions::default(),
    )
    .expect("service should start");
    service.stop().await;

    // a fresh store over the same pool still sees the record
    let reopened = SqlitePersistStore::new(pool);
    let record = reopened
        .get("mode")
        .await
        .expect("read should succeed")
        .expect("record should survive the restart");
    assert_eq!(record.value.as_str(), Some("evening"));
}
