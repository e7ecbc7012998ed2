//! Shared contract types between the boot sequence, the storage bridge, and the application
//! runtime it starts.
//!
//! The application runtime is treated as an opaque collaborator: it is started through
//! [`AppRuntime::init`] with a mount node and [`BootFlags`], and talks to the host through JSON
//! port messages on an [`AppHandle`]. Persistent storage is reached only through the
//! synchronous [`StorageAdapter`] trait so hosts and tests can inject their own store.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod flags;
pub mod ports;
pub mod runtime;
pub mod storage;
pub mod time;

pub use error::{BootError, DoubleBindError, MountError, StorageError};
pub use flags::{BootFlags, WindowSize, WireFlags};
pub use ports::{
    next_instance_id, parse_storage_request, AppHandle, AppInstanceId, InboundSender,
    MalformedStorageMessage, OutboundListener, StorageRequest, StorageResponse,
};
pub use runtime::{
    AppRuntime, HostEnvironment, InitConfig, StartupTask, StartupTaskFuture, TaskSpawner,
};
pub use storage::{
    MemoryStorage, StorageAdapter, StorageChange, StorageChangeListener, AUTH_TOKEN_KEY,
};
pub use time::unix_time_ms_now;
