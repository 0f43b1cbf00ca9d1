//! Aspired engine: reaction to stream events.
//!
//! Each incoming event is tested against every unpaused aspire. A firing
//! aspire produces one action per group it drives, then enters its delay
//! window so a chatty sensor cannot hammer the action queue.

use std::collections::HashMap;

use luma_domain::items::ActionItem;
use luma_domain::stream::StreamEvent;
use luma_domain::time::Timestamp;

use super::context::WhereContext;
use super::occurd::occurd;
use super::whered::whered;

/// Stateful reactor for aspires.
#[derive(Debug, Default)]
pub struct AspiredEngine {
    /// Last fire instant per aspire.
    fired: HashMap<String, Timestamp>,
}

impl AspiredEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// React to one name-resolved event and return the actions to enqueue.
    pub fn react(&mut self, event: &StreamEvent, ctx: &WhereContext<'_>) -> Vec<ActionItem> {
        let mut items = Vec::new();
        for aspire in ctx.children.aspires() {
            if aspire.paused
                || !occurd(&aspire.occurs, event)
                || !whered(&aspire.wheres, ctx)
                || self.suppressed(&aspire.name, aspire.delay_secs, ctx.now)
            {
                continue;
            }
            for group in &aspire.groups {
                let Ok(config) = ctx.children.group(group) else {
                    continue;
                };
                items.push(ActionItem::new(
                    config.origin.clone(),
                    group.clone(),
                    aspire.target(),
                    aspire.name.clone(),
                ));
            }
            self.fired.insert(aspire.name.clone(), ctx.now);
        }
        items
    }

    fn suppressed(&self, name: &str, delay_secs: u64, now: Timestamp) -> bool {
        if delay_secs == 0 {
            return false;
        }
        self.fired
            .get(name)
            .is_some_and(|last| now - *last < seconds(delay_secs))
    }
}

// chrono panics on durations past ~i64::MAX milliseconds, so saturate
fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}
