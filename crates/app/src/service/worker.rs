//! Worker loops and periodic tasks.
//!
//! Queue consumers poll with a short idle sleep instead of awaiting the
//! channel, so they can notice the shutdown flags between items: `cancel`
//! breaks the loop immediately, `vacate` once the queue runs dry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use luma_domain::error::{LumaError, NotFoundError};
use luma_domain::items::{ActionItem, ActionTarget, StreamItem, UpdateItem};
use luma_domain::persist::PersistValue;

use crate::children::Children;
use crate::engine::{AspiredEngine, DesiredEngine, WhereContext};
use crate::ports::{OriginCommand, Origins, PersistStore};
use crate::stream_bus::{StreamBus, StreamPublisher};

use super::queue::{QueueReceiver, QueueSender};
use super::signals::SignalWatch;
use super::state::StateIndex;

pub(crate) const IDLE_POLL: Duration = Duration::from_millis(100);

/// Everything a worker may need, cheaply cloneable.
pub(crate) struct WorkerDeps<P> {
    pub children: Arc<Children>,
    pub origins: Arc<Origins>,
    pub store: Arc<P>,
    pub state: Arc<RwLock<StateIndex>>,
}

impl<P> Clone for WorkerDeps<P> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            origins: self.origins.clone(),
            store: self.store.clone(),
            state: self.state.clone(),
        }
    }
}

/// Poll every origin on the refresh interval and enqueue fresh snapshots.
pub(crate) async fn refresher(
    mut watch: SignalWatch,
    origins: Arc<Origins>,
    updates: QueueSender<UpdateItem>,
    interval: Duration,
) {
    loop {
        if watch.cancelled() || watch.vacated() {
            break;
        }
        for (name, origin) in origins.iter() {
            match origin.refresh().await {
                Ok(snapshot) => updates.push(UpdateItem::new(name.clone(), snapshot)),
                Err(error) => warn!(origin = %name, %error, "refresh failed"),
            }
        }
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = watch.interrupted() => break,
        }
    }
    debug!("refresher stopped");
}

/// Apply snapshots to the state index and fan the implied events out.
pub(crate) async fn update_worker(
    mut queue: QueueReceiver<UpdateItem>,
    watch: SignalWatch,
    state: Arc<RwLock<StateIndex>>,
    streams: QueueSender<StreamItem>,
) {
    loop {
        if watch.cancelled() {
            break;
        }
        let Some(update) = queue.try_pull() else {
            if watch.vacated() {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };
        let events = state.write().await.apply(update);
        for event in events {
            streams.push(StreamItem::new(event));
        }
    }
    debug!("update worker stopped");
}

/// Resolve, publish, and react to stream events.
pub(crate) async fn stream_worker<P: PersistStore>(
    mut queue: QueueReceiver<StreamItem>,
    watch: SignalWatch,
    deps: WorkerDeps<P>,
    actions: QueueSender<ActionItem>,
    bus: StreamBus,
    potent: bool,
) {
    let mut engine = AspiredEngine::new();
    loop {
        if watch.cancelled() {
            break;
        }
        let Some(item) = queue.try_pull() else {
            if watch.vacated() {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };

        let resolved = {
            let state = deps.state.read().await;
            match state.resolve_device_name(&deps.children, &item.event) {
                Some(name) => item.event.clone().renamed(name),
                None => item.event.clone(),
            }
        };

        let persist = load_persist(deps.store.as_ref()).await;
        let planned = {
            let state = deps.state.read().await;
            let ctx = WhereContext::new(&persist, state.snapshots(), &deps.children);
            engine.react(&resolved, &ctx)
        };

        bus.publish(StreamItem {
            origin: item.origin,
            event: resolved,
            issued: item.issued,
        });

        if potent {
            for action in planned {
                debug!(
                    origin = %action.origin,
                    group = %action.group,
                    source = %action.source,
                    "aspire fired"
                );
                actions.push(action);
            }
        } else if !planned.is_empty() {
            debug!(count = planned.len(), "potent disabled, discarding actions");
        }
    }
    debug!("stream worker stopped");
}

/// Turn action items into origin commands and execute them.
pub(crate) async fn action_worker<P: PersistStore>(
    mut queue: QueueReceiver<ActionItem>,
    watch: SignalWatch,
    deps: WorkerDeps<P>,
    dryrun: bool,
) {
    loop {
        if watch.cancelled() {
            break;
        }
        let Some(item) = queue.try_pull() else {
            if watch.vacated() {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        };
        if let Err(error) = dispatch(&item, &deps, dryrun).await {
            warn!(
                origin = %item.origin,
                group = %item.group,
                source = %item.source,
                %error,
                "action failed"
            );
        }
    }
    debug!("action worker stopped");
}

async fn dispatch<P: PersistStore>(
    item: &ActionItem,
    deps: &WorkerDeps<P>,
    dryrun: bool,
) -> Result<(), LumaError> {
    let origin = deps.origins.get(&item.origin).ok_or_else(|| NotFoundError {
        entity: "origin",
        id: item.origin.clone(),
    })?;
    let group = deps.children.group(&item.group)?;

    let unique = match &group.unique {
        Some(unique) => unique.clone(),
        None => {
            let state = deps.state.read().await;
            let label = group.label.as_deref().unwrap_or(&group.name);
            state
                .snapshots()
                .get(&item.origin)
                .and_then(|snapshot| snapshot.group_by_label(label))
                .map(str::to_string)
                .ok_or_else(|| NotFoundError {
                    entity: "group",
                    id: item.group.clone(),
                })?
        }
    };

    let command = match &item.target {
        ActionTarget::Scene(name) => {
            let scene = deps.children.scene(name)?;
            OriginCommand {
                group: unique,
                scene_label: Some(scene.label().to_string()),
                stage: scene.stage,
            }
        }
        ActionTarget::Stage(stage) => OriginCommand {
            group: unique,
            scene_label: None,
            stage: Some(*stage),
        },
    };

    if dryrun {
        info!(
            origin = %item.origin,
            group = %item.group,
            source = %item.source,
            "dryrun, skipping perform"
        );
        return Ok(());
    }
    origin.perform(&command).await
}

/// Evaluate desires on the tick interval and prune expired records.
pub(crate) async fn planner<P: PersistStore>(
    mut watch: SignalWatch,
    deps: WorkerDeps<P>,
    actions: QueueSender<ActionItem>,
    interval: Duration,
    potent: bool,
) {
    let mut engine = DesiredEngine::new();
    loop {
        if watch.cancelled() || watch.vacated() {
            break;
        }
        match deps.store.prune_expired().await {
            Ok(0) => {}
            Ok(count) => debug!(count, "pruned expired persistence records"),
            Err(error) => warn!(%error, "failed to prune expired records"),
        }

        let persist = load_persist(deps.store.as_ref()).await;
        let planned = {
            let state = deps.state.read().await;
            let ctx = WhereContext::new(&persist, state.snapshots(), &deps.children);
            engine.plan(&ctx)
        };

        if potent {
            for action in planned {
                debug!(
                    origin = %action.origin,
                    group = %action.group,
                    source = %action.source,
                    "desire planned"
                );
                actions.push(action);
            }
        } else if !planned.is_empty() {
            debug!(count = planned.len(), "potent disabled, discarding actions");
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = watch.interrupted() => break,
        }
    }
    debug!("planner stopped");
}

async fn load_persist<P: PersistStore>(store: &P) -> HashMap<String, PersistValue> {
    match store.list().await {
        Ok(records) => records
            .into_iter()
            .map(|record| (record.unique, record.value))
            .collect(),
        Err(error) => {
            warn!(%error, "failed to load persistence records");
            HashMap::new()
        }
    }
}
