//! Browser (`wasm32`) implementations of [`boot_contract`] host contracts.
//!
//! This crate is the concrete browser-side wiring layer for persistent storage
//! (`localStorage`), environment queries made at boot, service worker registration, and the
//! local task spawner. Non-wasm builds compile the same API with memory or unsupported
//! fallbacks so the runtime crates stay testable natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for boot wiring.
pub mod adapters;
pub mod environment;
pub mod service_worker;
pub mod storage;

pub use adapters::{
    host_strategy_name, local_task_spawner, selected_host_strategy, storage_adapter,
    HostStrategy, StorageAdapterKind,
};
pub use environment::{
    current_query_string, viewport_px, MountNode, WebHostEnvironment, FALLBACK_VIEWPORT,
};
pub use service_worker::{
    register_service_worker, ServiceWorkerRegistration, DEFAULT_SERVICE_WORKER_URL,
};
pub use storage::local_storage::{classify_storage_failure, WebLocalStorage};
