//! Panel errors.

use expohub_client::ApiError;
use expohub_runtime::error::StoreError;
use thiserror::Error;

/// Errors returned by panel mutations.
///
/// The operator has already been alerted by the time one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The backend refused the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The scanner store is shutting down.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Properties can only be listed under an approved application.
    #[error("Application #{0} is not approved")]
    NotApproved(i64),
}
