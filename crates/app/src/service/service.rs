//! Service assembly and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use luma_domain::error::{LumaError, NotFoundError};
use luma_domain::items::StreamItem;

use crate::children::Children;
use crate::ports::PersistStore;
use crate::stream_bus::StreamBus;

use super::queue::queue;
use super::signals::Signals;
use super::state::StateIndex;
use super::worker::{self, WorkerDeps};
use crate::ports::Origins;

/// Runtime switches and intervals for one service instance.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Resolve actions but never call the vendor.
    pub dryrun: bool,
    /// When false, engines run but planned actions are discarded.
    pub potent: bool,
    /// How often origins are polled for fresh snapshots.
    pub refresh_interval: Duration,
    /// How often desires are evaluated.
    pub tick_interval: Duration,
    /// Capacity of each bounded work queue.
    pub queue_capacity: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            dryrun: false,
            potent: true,
            refresh_interval: Duration::from_secs(30),
            tick_interval: Duration::from_secs(10),
            queue_capacity: 64,
        }
    }
}

/// The running automation service.
pub struct Service;

impl Service {
    /// Spawn all service tasks and return the lifecycle handle.
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::NotFound`] when a configured origin has no
    /// connection in `origins`.
    pub fn start<P: PersistStore + 'static>(
        children: Children,
        origins: Origins,
        store: P,
        options: ServiceOptions,
    ) -> Result<ServiceHandle, LumaError> {
        for name in children.origins() {
            if !origins.contains_key(name) {
                return Err(NotFoundError {
                    entity: "origin",
                    id: name.clone(),
                }
                .into());
            }
        }

        let signals = Signals::new();
        let bus = StreamBus::new(options.queue_capacity);
        let deps = WorkerDeps {
            children: Arc::new(children),
            origins: Arc::new(origins),
            store: Arc::new(store),
            state: Arc::new(RwLock::new(StateIndex::new())),
        };

        let (action_tx, action_rx) = queue("actions", options.queue_capacity);
        let (update_tx, update_rx) = queue("updates", options.queue_capacity);
        let (stream_tx, stream_rx) = queue("streams", options.queue_capacity);

        info!(
            origins = deps.origins.len(),
            dryrun = options.dryrun,
            potent = options.potent,
            "starting service"
        );

        let tasks = vec![
            tokio::spawn(worker::refresher(
                signals.watch(),
                deps.origins.clone(),
                update_tx,
                options.refresh_interval,
            )),
            tokio::spawn(worker::update_worker(
                update_rx,
                signals.watch(),
                deps.state.clone(),
                stream_tx,
            )),
            tokio::spawn(worker::stream_worker(
                stream_rx,
                signals.watch(),
                deps.clone(),
                action_tx.clone(),
                bus.clone(),
                options.potent,
            )),
            tokio::spawn(worker::action_worker(
                action_rx,
                signals.watch(),
                deps.clone(),
                options.dryrun,
            )),
            tokio::spawn(worker::planner(
                signals.watch(),
                deps,
                action_tx,
                options.tick_interval,
                options.potent,
            )),
        ];

        Ok(ServiceHandle {
            signals,
            tasks,
            bus,
        })
    }
}

/// Lifecycle handle for a started [`Service`].
#[derive(Debug)]
pub struct ServiceHandle {
    signals: Signals,
    tasks: Vec<JoinHandle<()>>,
    bus: StreamBus,
}

impl ServiceHandle {
    /// Subscribe to resolved stream items.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StreamItem> {
        self.bus.subscribe()
    }

    /// Ask all tasks to stop immediately, abandoning queued work.
    pub fn cancel(&self) {
        self.signals.cancel();
    }

    /// Drain queues, stop all tasks, and wait for them to finish.
    pub async fn stop(self) {
        self.signals.vacate();
        for task in self.tasks {
            let _ = task.await;
        }
        info!("service stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::future::Future;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use luma_domain::aspire::Aspire;
    use luma_domain::desire::Desire;
    use luma_domain::device::Device;
    use luma_domain::error::LumaError;
    use luma_domain::group::Group;
    use luma_domain::occur::{OccurCond, OccurKind, PhilipsMotionParams};
    use luma_domain::persist::PersistRecord;
    use luma_domain::scene::Scene;
    use luma_domain::snapshot::{DeviceState, GroupState, OriginSnapshot, SceneState};
    use luma_domain::stage::Stage;
    use luma_domain::stream::StreamKind;
    use luma_domain::time::now;

    use super::*;
    use crate::ports::{Origin, OriginCommand};

    struct MemoryStore {
        records: Mutex<HashMap<String, PersistRecord>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
            }
        }
    }

    impl PersistStore for MemoryStore {
        fn get(
            &self,
            unique: &str,
        ) -> impl Future<Output = Result<Option<PersistRecord>, LumaError>> + Send {
            let record = self
                .records
                .lock()
                .unwrap()
                .get(unique)
                .filter(|record| !record.is_expired(now()))
                .cloned();
            async move { Ok(record) }
        }

        fn put(
            &self,
            record: PersistRecord,
        ) -> impl Future<Output = Result<(), LumaError>> + Send {
            self.records
                .lock()
                .unwrap()
                .insert(record.unique.clone(), record);
            async move { Ok(()) }
        }

        fn delete(&self, unique: &str) -> impl Future<Output = Result<(), LumaError>> + Send {
            self.records.lock().unwrap().remove(unique);
            async move { Ok(()) }
        }

        fn list(&self) -> impl Future<Output = Result<Vec<PersistRecord>, LumaError>> + Send {
            let records = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|record| !record.is_expired(now()))
                .cloned()
                .collect();
            async move { Ok(records) }
        }

        fn prune_expired(&self) -> impl Future<Output = Result<u64, LumaError>> + Send {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|_, record| !record.is_expired(now()));
            let pruned = (before - records.len()) as u64;
            async move { Ok(pruned) }
        }
    }

    struct FakeOrigin {
        name: String,
        snapshots: Mutex<VecDeque<OriginSnapshot>>,
        last: Mutex<Option<OriginSnapshot>>,
        performed: Arc<Mutex<Vec<OriginCommand>>>,
    }

    impl FakeOrigin {
        fn new(
            name: &str,
            snapshots: Vec<OriginSnapshot>,
        ) -> (Arc<Self>, Arc<Mutex<Vec<OriginCommand>>>) {
            let performed = Arc::new(Mutex::new(Vec::new()));
            let origin = Arc::new(Self {
                name: name.to_string(),
                snapshots: Mutex::new(snapshots.into()),
                last: Mutex::new(None),
                performed: performed.clone(),
            });
            (origin, performed)
        }
    }

    #[async_trait]
    impl Origin for FakeOrigin {
        fn name(&self) -> &str {
            &self.name
        }

        async fn refresh(&self) -> Result<OriginSnapshot, LumaError> {
            let next = self.snapshots.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(snapshot) = next {
                *last = Some(snapshot);
            }
            last.clone()
                .ok_or_else(|| LumaError::Storage("no snapshot scripted".into()))
        }

        async fn perform(&self, command: &OriginCommand) -> Result<(), LumaError> {
            self.performed.lock().unwrap().push(command.clone());
            Ok(())
        }
    }

    fn snapshot(motion: bool) -> OriginSnapshot {
        let mut snapshot = OriginSnapshot::new(now());
        snapshot.devices.insert(
            "dev-1".to_string(),
            DeviceState {
                motion: Some(motion),
                ..DeviceState::default()
            },
        );
        snapshot
            .groups
            .insert("room-1".to_string(), GroupState::default());
        snapshot.scenes.insert(
            "scene-1".to_string(),
            SceneState {
                label: Some("bright".to_string()),
                group: Some("room-1".to_string()),
            },
        );
        snapshot
    }

    fn children_with(desires: Vec<Desire>, aspires: Vec<Aspire>) -> Children {
        Children::new(
            vec!["hue".to_string()],
            vec![Device::new("kitchen_motion", "hue", "dev-1")],
            vec![Group::new("kitchen", "hue", "room-1")],
            vec![Scene::new("bright")],
            desires,
            aspires,
        )
        .unwrap()
    }

    fn motion_aspire() -> Aspire {
        Aspire::builder()
            .name("kitchen_on_motion")
            .group("kitchen")
            .occur(OccurCond::new(OccurKind::PhilipsMotion(
                PhilipsMotionParams {
                    device: "kitchen_motion".to_string(),
                    active: true,
                },
            )))
            .scene("bright")
            .build()
            .unwrap()
    }

    async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    fn origins_map(origin: Arc<FakeOrigin>) -> Origins {
        let origin: Arc<dyn Origin> = origin;
        HashMap::from([("hue".to_string(), origin)])
    }

    fn fast_options() -> ServiceOptions {
        ServiceOptions {
            refresh_interval: Duration::from_millis(10),
            tick_interval: Duration::from_millis(10),
            ..ServiceOptions::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_perform_scene_recall_when_aspire_fires() {
        let (origin, performed) =
            FakeOrigin::new("hue", vec![snapshot(false), snapshot(true)]);
        let handle = Service::start(
            children_with(vec![], vec![motion_aspire()]),
            origins_map(origin),
            MemoryStore::new(),
            fast_options(),
        )
        .unwrap();

        assert!(wait_for(|| !performed.lock().unwrap().is_empty()).await);
        let commands = performed.lock().unwrap().clone();
        assert_eq!(commands[0].group, "room-1");
        assert_eq!(commands[0].scene_label.as_deref(), Some("bright"));
        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_publish_resolved_events_on_the_bus() {
        let (origin, _) = FakeOrigin::new("hue", vec![snapshot(false), snapshot(true)]);
        let handle = Service::start(
            children_with(vec![], vec![]),
            origins_map(origin),
            MemoryStore::new(),
            fast_options(),
        )
        .unwrap();
        let mut events = handle.subscribe();

        let item = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.origin, "hue");
        assert_eq!(item.event.kind, StreamKind::Motion { active: true });
        // vendor unique resolved to the configured name
        assert_eq!(item.event.device.as_deref(), Some("kitchen_motion"));
        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_not_perform_when_dryrun() {
        let (origin, performed) =
            FakeOrigin::new("hue", vec![snapshot(false), snapshot(true)]);
        let handle = Service::start(
            children_with(vec![], vec![motion_aspire()]),
            origins_map(origin),
            MemoryStore::new(),
            ServiceOptions {
                dryrun: true,
                ..fast_options()
            },
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(performed.lock().unwrap().is_empty());
        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_not_enqueue_actions_when_not_potent() {
        let (origin, performed) =
            FakeOrigin::new("hue", vec![snapshot(false), snapshot(true)]);
        let handle = Service::start(
            children_with(vec![], vec![motion_aspire()]),
            origins_map(origin),
            MemoryStore::new(),
            ServiceOptions {
                potent: false,
                ..fast_options()
            },
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(performed.lock().unwrap().is_empty());
        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_plan_and_perform_desired_stage() {
        let desire = Desire::builder()
            .name("always_on")
            .group("kitchen")
            .stage(Stage::on())
            .build()
            .unwrap();
        let (origin, performed) = FakeOrigin::new("hue", vec![snapshot(false)]);
        let handle = Service::start(
            children_with(vec![desire], vec![]),
            origins_map(origin),
            MemoryStore::new(),
            fast_options(),
        )
        .unwrap();

        assert!(wait_for(|| !performed.lock().unwrap().is_empty()).await);
        let commands = performed.lock().unwrap().clone();
        assert_eq!(commands[0].group, "room-1");
        assert_eq!(commands[0].stage, Some(Stage::on()));
        assert_eq!(commands[0].scene_label, None);
        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_refuse_to_start_without_connected_origin() {
        let error = Service::start(
            children_with(vec![], vec![]),
            Origins::new(),
            MemoryStore::new(),
            fast_options(),
        )
        .unwrap_err();
        let LumaError::NotFound(error) = error else {
            panic!("expected a not-found error");
        };
        assert_eq!(error.entity, "origin");
        assert_eq!(error.id, "hue");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn should_stop_cleanly() {
        let (origin, _) = FakeOrigin::new("hue", vec![snapshot(false)]);
        let handle = Service::start(
            children_with(vec![], vec![]),
            origins_map(origin),
            MemoryStore::new(),
            fast_options(),
        )
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .unwrap();
    }
}
