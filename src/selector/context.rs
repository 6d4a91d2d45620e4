use crate::error::UiError;

/// Default ceiling on resolution/interaction calls per script execution.
pub const MAX_ACTION_COUNT: u32 = 100;

/// Execution-scoped action budget.
///
/// Threaded through every resolution call instead of living in shared
/// global state; constructing a fresh context is the only way the counter
/// resets. Guards against generated scripts that loop without progress.
#[derive(Debug, Clone)]
pub struct ExecContext {
    action_count: u32,
    max_actions: u32,
}

impl ExecContext {
    pub fn new() -> Self {
        ExecContext {
            action_count: 0,
            max_actions: MAX_ACTION_COUNT,
        }
    }

    pub fn with_limit(max_actions: u32) -> Self {
        ExecContext {
            action_count: 0,
            max_actions,
        }
    }

    /// Charge one resolution/interaction call against the budget.
    pub fn charge(&mut self) -> Result<(), UiError> {
        if self.action_count >= self.max_actions {
            return Err(UiError::ActionBudgetExceeded {
                limit: self.max_actions,
            });
        }
        self.action_count += 1;
        Ok(())
    }

    pub fn action_count(&self) -> u32 {
        self.action_count
    }

    pub fn limit(&self) -> u32 {
        self.max_actions
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new()
    }
}
