//! # ExpoHub Panels
//!
//! Role-scoped controllers over backend collections.
//!
//! All panels share one contract:
//!
//! - `load()` fetches the primary collections; failures are logged and the
//!   previous contents kept
//! - mutations call the backend, then re-fetch the affected collection (no
//!   optimistic updates)
//! - destructive mutations ask [`Prompt::confirm`] first
//! - failed mutations are reported through [`Prompt::alert`] and returned as
//!   [`PanelError`]
//!
//! The admin panel also owns the [`QrScanner`], a small reducer of its own.

pub mod admin;
pub mod error;
pub mod exhibitor;
pub mod prompt;
pub mod scanner;
pub mod visitor;

pub use admin::AdminPanel;
pub use error::PanelError;
pub use exhibitor::ExhibitorPanel;
pub use prompt::{AssumeYes, Prompt};
pub use scanner::{
    QrScanner, QrVerifier, ScanOutcome, ScanPhase, ScanResult, ScannerAction, ScannerEnvironment,
    ScannerReducer, ScannerState,
};
pub use visitor::VisitorPanel;

use expohub_client::ApiError;

/// Alert the operator about a failed mutation and wrap the error.
pub(crate) fn alert_failure(prompt: &dyn Prompt, action: &str, error: ApiError) -> PanelError {
    tracing::warn!(%error, action, "Panel action failed");
    prompt.alert(&format!("Failed to {action}: {error}"));
    PanelError::Api(error)
}
