//! Confirmation step for destructive actions.

/// Asks the operator to confirm a destructive action.
pub trait ConfirmPrompt: Send + Sync {
    /// Return `true` to go ahead.
    fn confirm(&self, question: &str) -> bool;
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&self, question: &str) -> bool {
        tracing::debug!(question, "Auto-confirmed");
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl ConfirmPrompt for AssumeNo {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}
