use serde::{Deserialize, Serialize};

use crate::state::state_model::DeviceState;

/// Where in the authored script an operation came from.
///
/// `original_lineno` indexes the authored script (0-based); all diagnostics
/// are reported against it, never against the expanded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRef {
    pub current_code: String,
    pub original_lineno: usize,
    pub original_code: String,
}

/// One append-only execution log record: what was on screen, what was done
/// to it, and the fingerprints of the state it was done in.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub state: String,
    pub action: Option<String>,
    pub target: Option<String>,
    pub input: Option<String>,
    pub state_str: String,
    pub structure_str: String,
    pub tag: String,
    pub width: u32,
    pub height: u32,
    pub code: Option<CodeRef>,
}

impl TraceRecord {
    pub fn for_state(state: &DeviceState) -> Self {
        TraceRecord {
            state: state.rendering().tree.render(),
            action: None,
            target: None,
            input: None,
            state_str: state.state_str(),
            structure_str: state.structure_str(),
            tag: state.tag.clone(),
            width: state.width,
            height: state.height,
            code: None,
        }
    }

    pub fn with_action(mut self, action: impl ToString) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_target(mut self, target: impl ToString) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_input(mut self, input: impl ToString) -> Self {
        self.input = Some(input.to_string());
        self
    }

    pub fn with_code(mut self, code: Option<&CodeRef>) -> Self {
        self.code = code.cloned();
        self
    }
}
