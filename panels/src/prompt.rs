//! Operator prompts.

/// Blocking confirm/alert dialogs shown by panels.
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question. Destructive actions only proceed on `true`.
    fn confirm(&self, message: &str) -> bool;

    /// Tell the operator an action failed.
    fn alert(&self, message: &str);
}

/// Prompt for unattended use: confirms everything and logs alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(%message, "Confirmed without asking");
        true
    }

    fn alert(&self, message: &str) {
        tracing::warn!(%message, "Alert");
    }
}
