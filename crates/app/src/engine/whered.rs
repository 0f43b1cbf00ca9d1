//! Where condition evaluation.
//!
//! Conditions inside one family are ANDed; families are ORed against each
//! other. An empty condition list is vacuously true, so a desire without
//! wheres holds at every tick.

use std::collections::BTreeMap;

use chrono::Datelike;
use luma_domain::condition::{
    parse_time_of_day, PeriodParams, PhilipsChangeParams, PhilipsSceneParams, RegexpParams,
    StoreOperator, StoreParams, UbiquitiClientParams, WhereCond, WhereKind,
};

use super::context::WhereContext;

/// Evaluate a rule's where conditions against the context.
#[must_use]
pub fn whered(wheres: &[WhereCond], ctx: &WhereContext<'_>) -> bool {
    if wheres.is_empty() {
        return true;
    }
    let mut families: BTreeMap<&str, Vec<&WhereKind>> = BTreeMap::new();
    for cond in wheres {
        families.entry(&cond.family).or_default().push(&cond.kind);
    }
    families
        .values()
        .any(|conds| conds.iter().all(|kind| eval(kind, ctx)))
}

fn eval(kind: &WhereKind, ctx: &WhereContext<'_>) -> bool {
    match kind {
        WhereKind::Store(params) => eval_store(params, ctx),
        WhereKind::Period(params) => eval_period(params, ctx),
        WhereKind::Regexp(params) => eval_regexp(params, ctx),
        WhereKind::PhilipsChange(params) => eval_philips_change(params, ctx),
        WhereKind::PhilipsScene(params) => eval_philips_scene(params, ctx),
        WhereKind::UbiquitiClient(params) => eval_ubiquiti_client(params, ctx),
    }
}

fn eval_store(params: &StoreParams, ctx: &WhereContext<'_>) -> bool {
    let current = ctx.persist.get(&params.unique);
    let equal = match (&current, &params.value) {
        (Some(current), Some(want)) => *current == want,
        _ => false,
    };
    match params.operator {
        StoreOperator::Present => current.is_some(),
        StoreOperator::Absent => current.is_none(),
        StoreOperator::Eq => equal,
        StoreOperator::Ne => !equal,
    }
}

fn eval_period(params: &PeriodParams, ctx: &WhereContext<'_>) -> bool {
    if let Some(days) = &params.days {
        let today = ctx.local.weekday().into();
        if !days.contains(&today) {
            return false;
        }
    }
    let time = ctx.local.time();
    let start = params.start.as_deref().map(parse_time_of_day);
    let stop = params.stop.as_deref().map(parse_time_of_day);
    match (start, stop) {
        (Some(Err(_)), _) | (_, Some(Err(_))) => false,
        (None, None) => true,
        (Some(Ok(start)), None) => time >= start,
        (None, Some(Ok(stop))) => time < stop,
        (Some(Ok(start)), Some(Ok(stop))) => {
            if start <= stop {
                time >= start && time < stop
            } else {
                // stop before start spans midnight
                time >= start || time < stop
            }
        }
    }
}

fn eval_regexp(params: &RegexpParams, ctx: &WhereContext<'_>) -> bool {
    let Some(value) = ctx.persist.get(&params.unique).and_then(|v| v.as_str()) else {
        return false;
    };
    match regex::Regex::new(&params.pattern) {
        Ok(pattern) => pattern.is_match(value),
        Err(_) => false,
    }
}

fn eval_philips_change(params: &PhilipsChangeParams, ctx: &WhereContext<'_>) -> bool {
    let window = seconds(params.since_secs);
    params.devices.iter().all(|name| {
        let Some(state) = ctx.device_state(name) else {
            return false;
        };
        // a device that never reported a change counts as idle
        state
            .changed
            .map_or(true, |changed| ctx.now - changed >= window)
    })
}

fn eval_philips_scene(params: &PhilipsSceneParams, ctx: &WhereContext<'_>) -> bool {
    let Some(view) = ctx.group_view(&params.group) else {
        return false;
    };
    let Some(active) = view.state.active_scene.as_deref() else {
        return false;
    };
    params.scenes.iter().any(|name| {
        let Ok(scene) = ctx.children.scene(name) else {
            return false;
        };
        view.snapshot.scene_by_label(view.unique, scene.label()) == Some(active)
    })
}

fn eval_ubiquiti_client(params: &UbiquitiClientParams, ctx: &WhereContext<'_>) -> bool {
    let window = seconds(params.since_secs);
    params.clients.iter().any(|name| {
        ctx.client_state(name)
            .is_some_and(|client| ctx.now - client.last_seen <= window)
    })
}

// chrono panics on durations past ~i64::MAX milliseconds, so saturate
fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}
