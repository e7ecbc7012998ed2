//! Error taxonomy for storage access, boot, and bridge binding.

use thiserror::Error;

use crate::ports::AppInstanceId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failure reported by a [`crate::StorageAdapter`] operation.
pub enum StorageError {
    /// The store does not exist in this host or could not be opened.
    #[error("storage unavailable")]
    Unavailable,
    /// The store rejected a write because its quota is exhausted.
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded {
        /// Key whose write was rejected.
        key: String,
    },
    /// The host denied access (privacy settings, sandboxed frames).
    #[error("storage access denied: {0}")]
    AccessDenied(String),
    /// Any other backend failure.
    #[error("storage operation failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("mount target `#{element_id}` not found")]
/// The element the application renders into does not exist.
pub struct MountError {
    /// DOM id that was looked up.
    pub element_id: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("storage bridge already bound to app instance {bound_to}")]
/// A storage bridge was bound a second time.
pub struct DoubleBindError {
    /// Instance that holds the existing binding.
    pub bound_to: AppInstanceId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Fatal startup failures surfaced to the process entrypoint.
pub enum BootError {
    /// The mount target is missing; nothing can render.
    #[error(transparent)]
    Mount(#[from] MountError),
    /// The application runtime refused to start.
    #[error("application init failed: {0}")]
    Init(String),
    /// The storage bridge could not attach to the started application.
    #[error(transparent)]
    Bind(#[from] DoubleBindError),
}
