//! Occur condition evaluation.
//!
//! Same family scheme as the where engine: occurs inside one family must
//! all match the event, any one matching family fires the rule. An empty
//! occur list never matches (validation rejects it at load time anyway).

use std::collections::BTreeMap;

use luma_domain::occur::OccurCond;
use luma_domain::stream::StreamEvent;

/// Evaluate a rule's occur conditions against a name-resolved event.
#[must_use]
pub fn occurd(occurs: &[OccurCond], event: &StreamEvent) -> bool {
    let mut families: BTreeMap<&str, Vec<&OccurCond>> = BTreeMap::new();
    for cond in occurs {
        families.entry(&cond.family).or_default().push(cond);
    }
    families
        .values()
        .any(|conds| conds.iter().all(|cond| cond.matches(event)))
}

#[cfg(test)]
mod tests {
    use luma_domain::occur::{OccurKind, PhilipsButtonParams, PhilipsMotionParams};
    use luma_domain::stream::{ButtonEvent, StreamKind};

    use super::*;

    fn motion_event(device: &str, active: bool) -> StreamEvent {
        StreamEvent::new("hue", Some(device.to_string()), StreamKind::Motion { active })
    }

    fn motion_cond(device: &str, family: &str) -> OccurCond {
        OccurCond::in_family(
            OccurKind::PhilipsMotion(PhilipsMotionParams {
                device: device.to_string(),
                active: true,
            }),
            family,
        )
    }

    #[test]
    fn should_never_match_without_occurs() {
        assert!(!occurd(&[], &motion_event("kitchen_motion", true)));
    }

    #[test]
    fn should_match_when_any_family_matches() {
        let occurs = vec![
            motion_cond("hallway_motion", "a"),
            motion_cond("kitchen_motion", "b"),
        ];
        assert!(occurd(&occurs, &motion_event("kitchen_motion", true)));
    }

    #[test]
    fn should_require_every_occur_in_a_family() {
        // one event cannot match two different devices in the same family
        let occurs = vec![
            motion_cond("kitchen_motion", "a"),
            OccurCond::in_family(
                OccurKind::PhilipsButton(PhilipsButtonParams {
                    device: "bedside_switch".to_string(),
                    events: vec![ButtonEvent::ShortRelease],
                }),
                "a",
            ),
        ];
        assert!(!occurd(&occurs, &motion_event("kitchen_motion", true)));
    }
}
