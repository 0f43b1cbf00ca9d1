//! Desired engine: periodic planning of winner actions per group.
//!
//! Every tick, each unpaused desire whose wheres hold competes for the
//! groups it drives. The highest weight wins a group; ties go to the
//! lexicographically smallest desire name so the outcome is stable across
//! ticks. Winners already satisfied by the latest snapshot, or inside
//! their re-fire delay, produce nothing.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use luma_domain::desire::Desire;
use luma_domain::items::{ActionItem, ActionTarget};
use luma_domain::stage::Stage;
use luma_domain::time::Timestamp;

use super::context::WhereContext;
use super::whered::whered;

/// Stateful planner for desires.
#[derive(Debug, Default)]
pub struct DesiredEngine {
    /// Last fire instant per (desire, group).
    fired: HashMap<(String, String), Timestamp>,
}

impl DesiredEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one planning tick and return the actions to enqueue.
    pub fn plan(&mut self, ctx: &WhereContext<'_>) -> Vec<ActionItem> {
        let mut winners: BTreeMap<&str, &Desire> = BTreeMap::new();
        for desire in ctx.children.desires() {
            if desire.paused || !whered(&desire.wheres, ctx) {
                continue;
            }
            for group in &desire.groups {
                match winners.entry(group.as_str()) {
                    Entry::Vacant(entry) => {
                        entry.insert(desire);
                    }
                    Entry::Occupied(mut entry) => {
                        let current = entry.get();
                        if desire.weight > current.weight
                            || (desire.weight == current.weight && desire.name < current.name)
                        {
                            entry.insert(desire);
                        }
                    }
                }
            }
        }

        let mut items = Vec::new();
        for (group, desire) in winners {
            if self.suppressed(desire, group, ctx.now) || satisfied(desire, group, ctx) {
                continue;
            }
            let Ok(config) = ctx.children.group(group) else {
                continue;
            };
            items.push(ActionItem::new(
                config.origin.clone(),
                group,
                desire.target(),
                desire.name.clone(),
            ));
            self.fired
                .insert((desire.name.clone(), group.to_string()), ctx.now);
        }
        items
    }

    fn suppressed(&self, desire: &Desire, group: &str, now: Timestamp) -> bool {
        if desire.delay_secs == 0 {
            return false;
        }
        self.fired
            .get(&(desire.name.clone(), group.to_string()))
            .is_some_and(|last| now - *last < seconds(desire.delay_secs))
    }
}

/// Whether the latest snapshot already shows the desire's target on this
/// group. Unknown state (no snapshot yet) counts as unsatisfied.
fn satisfied(desire: &Desire, group: &str, ctx: &WhereContext<'_>) -> bool {
    let Some(view) = ctx.group_view(group) else {
        return false;
    };
    match desire.target() {
        ActionTarget::Scene(name) => {
            let Ok(scene) = ctx.children.scene(&name) else {
                return false;
            };
            let Some(active) = view.state.active_scene.as_deref() else {
                return false;
            };
            view.snapshot.scene_by_label(view.unique, scene.label()) == Some(active)
        }
        ActionTarget::Stage(want) => stage_satisfied(view.state.stage, want),
    }
}

fn stage_satisfied(current: Stage, want: Stage) -> bool {
    want.state.map_or(true, |state| current.state == Some(state))
        && want.level.map_or(true, |level| current.level == Some(level))
        && want
            .color_temp
            .map_or(true, |mireds| current.color_temp == Some(mireds))
}

// chrono panics on durations past ~i64::MAX milliseconds, so saturate
fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use luma_domain::condition::{StoreOperator, StoreParams, WhereCond, WhereKind};
    use luma_domain::device::Device;
    use luma_domain::group::Group;
    use luma_domain::persist::PersistValue;
    use luma_domain::scene::Scene;
    use luma_domain::snapshot::{GroupState, OriginSnapshot, SceneState};
    use luma_domain::time::now;

    use super::*;
    use crate::children::Children;

    fn desire(name: &str, weight: u32) -> Desire {
        Desire::builder()
            .name(name)
            .group("kitchen")
            .stage(Stage::on())
            .weight(weight)
            .build()
            .unwrap()
    }

    fn children_with(desires: Vec<Desire>) -> Children {
        Children::new(
            vec!["hue".to_string()],
            vec![Device::new("kitchen_motion", "hue", "dev-1")],
            vec![Group::new("kitchen", "hue", "room-1")],
            vec![Scene::new("relax")],
            desires,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn should_plan_action_for_winning_desire() {
        let children = children_with(vec![desire("dim", 1), desire("bright", 5)]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        let mut engine = DesiredEngine::new();
        let items = engine.plan(&ctx);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "bright");
        assert_eq!(items[0].origin, "hue");
        assert_eq!(items[0].group, "kitchen");
    }

    #[test]
    fn should_break_weight_ties_by_name() {
        let children = children_with(vec![desire("beta", 3), desire("alpha", 3)]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        let items = DesiredEngine::new().plan(&ctx);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "alpha");
    }

    #[test]
    fn should_skip_paused_desires() {
        let paused = Desire::builder()
            .name("paused_one")
            .group("kitchen")
            .stage(Stage::on())
            .weight(100)
            .paused(true)
            .build()
            .unwrap();
        let children = children_with(vec![paused, desire("active", 1)]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        let items = DesiredEngine::new().plan(&ctx);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "active");
    }

    #[test]
    fn should_skip_desire_with_unmet_wheres() {
        let gated = Desire::builder()
            .name("gated")
            .group("kitchen")
            .stage(Stage::on())
            .r#where(WhereCond::new(WhereKind::Store(StoreParams {
                unique: "mode".to_string(),
                operator: StoreOperator::Present,
                value: None,
            })))
            .build()
            .unwrap();
        let children = children_with(vec![gated]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        assert!(DesiredEngine::new().plan(&ctx).is_empty());
    }

    #[test]
    fn should_plan_once_gate_opens() {
        let gated = Desire::builder()
            .name("gated")
            .group("kitchen")
            .stage(Stage::on())
            .r#where(WhereCond::new(WhereKind::Store(StoreParams {
                unique: "mode".to_string(),
                operator: StoreOperator::Present,
                value: None,
            })))
            .build()
            .unwrap();
        let children = children_with(vec![gated]);
        let persist = HashMap::from([("mode".to_string(), PersistValue::from("home"))]);
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        assert_eq!(DesiredEngine::new().plan(&ctx).len(), 1);
    }

    #[test]
    fn should_suppress_refire_within_delay() {
        let slow = Desire::builder()
            .name("slow")
            .group("kitchen")
            .stage(Stage::on())
            .delay_secs(3600)
            .build()
            .unwrap();
        let children = children_with(vec![slow]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        let mut engine = DesiredEngine::new();
        assert_eq!(engine.plan(&ctx).len(), 1);
        assert!(engine.plan(&ctx).is_empty());
    }

    #[test]
    fn should_suppress_forever_with_huge_delay() {
        let glacial = Desire::builder()
            .name("glacial")
            .group("kitchen")
            .stage(Stage::on())
            .delay_secs(u64::MAX)
            .build()
            .unwrap();
        let children = children_with(vec![glacial]);
        let persist = HashMap::new();
        let snapshots = HashMap::new();
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        let mut engine = DesiredEngine::new();
        assert_eq!(engine.plan(&ctx).len(), 1);
        assert!(engine.plan(&ctx).is_empty());
    }

    #[test]
    fn should_skip_group_already_at_scene_target() {
        let recall = Desire::builder()
            .name("recall")
            .group("kitchen")
            .scene("relax")
            .build()
            .unwrap();
        let children = children_with(vec![recall]);
        let persist = HashMap::new();

        let mut snapshot = OriginSnapshot::new(now());
        snapshot.groups.insert(
            "room-1".to_string(),
            GroupState {
                active_scene: Some("scene-9".to_string()),
                ..GroupState::default()
            },
        );
        snapshot.scenes.insert(
            "scene-9".to_string(),
            SceneState {
                label: Some("relax".to_string()),
                group: Some("room-1".to_string()),
            },
        );
        let snapshots = HashMap::from([("hue".to_string(), snapshot)]);
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        assert!(DesiredEngine::new().plan(&ctx).is_empty());
    }

    #[test]
    fn should_skip_group_already_at_stage_target() {
        let children = children_with(vec![desire("on", 1)]);
        let persist = HashMap::new();

        let mut snapshot = OriginSnapshot::new(now());
        snapshot.groups.insert(
            "room-1".to_string(),
            GroupState {
                stage: Stage::on(),
                ..GroupState::default()
            },
        );
        let snapshots = HashMap::from([("hue".to_string(), snapshot)]);
        let ctx = WhereContext::new(&persist, &snapshots, &children);

        assert!(DesiredEngine::new().plan(&ctx).is_empty());
    }
}
