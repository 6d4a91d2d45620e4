use std::collections::HashSet;

use crate::device::event::{InputEvent, ScrollDirection, ViewTarget};
use crate::state::state_model::DeviceState;

/// System decoration views that never receive synthesized input.
pub const SYSTEM_BAR_IDS: [&str; 2] = [
    "android:id/navigationBarBackground",
    "android:id/statusBarBackground",
];

/// Default payload for synthesized text entry.
pub const SET_TEXT_PAYLOAD: &str = "Hello World";

pub fn is_system_bar(resource_id: Option<&str>) -> bool {
    matches!(resource_id, Some(id) if SYSTEM_BAR_IDS.contains(&id))
}

/// Enumerate every input event this state could accept.
///
/// The pass order is part of the contract: callers consume the list
/// positionally for deterministic exploration, so passes must not be
/// re-ordered. Touch exclusion from the clickable/checkable passes covers
/// descendants; scrollable containers do not shield their children, which
/// keeps list items independently tappable in the fallback pass.
pub fn enumerate_possible_input(state: &DeviceState) -> Vec<InputEvent> {
    let views = state.views();
    let mut events = Vec::new();
    let mut touch_excluded: HashSet<usize> = HashSet::new();

    let enabled_ids: Vec<usize> = views
        .iter()
        .filter(|v| v.enabled && v.visible && !is_system_bar(v.resource_id.as_deref()))
        .map(|v| v.temp_id)
        .collect();

    // ---- clickable ----
    for &id in &enabled_ids {
        let Some(view) = views.get(id) else { continue };
        if view.clickable {
            events.push(InputEvent::Touch {
                target: ViewTarget::of(view),
            });
            touch_excluded.insert(id);
            touch_excluded.extend(views.descendants(id));
        }
    }

    // ---- scrollable ----
    for &id in &enabled_ids {
        let Some(view) = views.get(id) else { continue };
        if view.scrollable {
            for direction in [
                ScrollDirection::Up,
                ScrollDirection::Down,
                ScrollDirection::Left,
                ScrollDirection::Right,
            ] {
                events.push(InputEvent::Scroll {
                    target: ViewTarget::of(view),
                    direction,
                });
            }
        }
    }

    // ---- checkable ----
    for &id in &enabled_ids {
        let Some(view) = views.get(id) else { continue };
        if view.checkable && !touch_excluded.contains(&id) {
            events.push(InputEvent::Touch {
                target: ViewTarget::of(view),
            });
            touch_excluded.insert(id);
            touch_excluded.extend(views.descendants(id));
        }
    }

    // ---- long-clickable ----
    for &id in &enabled_ids {
        let Some(view) = views.get(id) else { continue };
        if view.long_clickable {
            events.push(InputEvent::LongTouch {
                target: ViewTarget::of(view),
            });
        }
    }

    // ---- editable ----
    for &id in &enabled_ids {
        let Some(view) = views.get(id) else { continue };
        if view.editable {
            events.push(InputEvent::SetText {
                target: ViewTarget::of(view),
                text: SET_TEXT_PAYLOAD.into(),
            });
            touch_excluded.insert(id);
        }
    }

    // ---- fallback leaf touches ----
    for &id in &enabled_ids {
        if touch_excluded.contains(&id) {
            continue;
        }
        let Some(view) = views.get(id) else { continue };
        if !view.children.is_empty() {
            continue;
        }
        events.push(InputEvent::Touch {
            target: ViewTarget::of(view),
        });
    }

    events
}
