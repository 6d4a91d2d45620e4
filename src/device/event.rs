use serde::{Deserialize, Serialize};

use crate::view::view_model::View;

/// The element an event is aimed at, captured at resolution time.
///
/// Carries only what the dispatcher needs to synthesize the gesture; no
/// live reference to the observation it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTarget {
    pub view_id: usize,
    pub bound_box: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl ViewTarget {
    pub fn of(view: &View) -> Self {
        ViewTarget {
            view_id: view.temp_id,
            bound_box: view.bound_box(),
            resource_id: view.resource_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Left => "left",
            ScrollDirection::Right => "right",
        }
    }

    /// Loose parse used for script arguments ("up", "Scroll Up", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower.contains("up") {
            Some(ScrollDirection::Up)
        } else if lower.contains("down") {
            Some(ScrollDirection::Down)
        } else if lower.contains("left") {
            Some(ScrollDirection::Left)
        } else if lower.contains("right") {
            Some(ScrollDirection::Right)
        } else {
            None
        }
    }
}

/// A concrete synthesizable input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum InputEvent {
    Touch {
        target: ViewTarget,
    },
    LongTouch {
        target: ViewTarget,
    },
    Scroll {
        target: ViewTarget,
        direction: ScrollDirection,
    },
    SetText {
        target: ViewTarget,
        text: String,
    },
    Key {
        name: String,
    },
}

impl InputEvent {
    pub fn back() -> Self {
        InputEvent::Key { name: "BACK".into() }
    }

    /// Target of the event, if it is aimed at an element.
    pub fn target(&self) -> Option<&ViewTarget> {
        match self {
            InputEvent::Touch { target }
            | InputEvent::LongTouch { target }
            | InputEvent::Scroll { target, .. }
            | InputEvent::SetText { target, .. } => Some(target),
            InputEvent::Key { .. } => None,
        }
    }

    /// Short action name recorded in trace logs.
    pub fn action_name(&self) -> String {
        match self {
            InputEvent::Touch { .. } => "touch".into(),
            InputEvent::LongTouch { .. } => "long_touch".into(),
            InputEvent::Scroll { direction, .. } => format!("scroll {}", direction.as_str()),
            InputEvent::SetText { .. } => "set_text".into(),
            InputEvent::Key { name } => format!("key {}", name),
        }
    }
}
