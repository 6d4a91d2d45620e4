use serde::{Deserialize, Serialize};

use crate::error::UiError;
use crate::view::view_model::View;

pub mod event;
pub mod replay;

use event::InputEvent;

/// One raw observation as delivered by the automation transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub views: Vec<View>,
    #[serde(default)]
    pub foreground_activity: String,
    #[serde(default)]
    pub activity_stack: Vec<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Observation tag, usually a capture timestamp. Generated if absent.
    #[serde(default)]
    pub tag: Option<String>,
}

/// The automation transport, as seen by the resolution engine.
///
/// `observe` blocks until the current hierarchy is available; `dispatch`
/// runs the action to completion. One action at a time: each action's
/// effect depends on the UI state left by the previous one.
pub trait Device {
    fn observe(&mut self) -> Result<RawObservation, UiError>;
    fn dispatch(&mut self, event: &InputEvent) -> Result<(), UiError>;
}
