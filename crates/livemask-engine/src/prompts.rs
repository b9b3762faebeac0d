//! Read-only view of the active prompt set.

use livemask_models::Prompt;

/// Source of the currently active prompts.
///
/// The prompt set is owned and validated elsewhere; the pipeline pulls one
/// snapshot per accepted frame. Implementations must not block: the snapshot
/// is taken on the capture callback's execution context.
pub trait PromptSource: Send + Sync {
    /// Snapshot of the currently active prompts.
    fn snapshot(&self) -> Vec<Prompt>;
}

/// Fixed prompt set, useful for tests and single-object sessions.
#[derive(Debug, Default)]
pub struct StaticPromptSource {
    prompts: std::sync::Mutex<Vec<Prompt>>,
}

impl StaticPromptSource {
    /// Create a source with an initial prompt set.
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts: std::sync::Mutex::new(prompts),
        }
    }

    /// Replace the prompt set.
    pub fn set(&self, prompts: Vec<Prompt>) {
        *self.prompts.lock().unwrap() = prompts;
    }
}

impl PromptSource for StaticPromptSource {
    fn snapshot(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}
