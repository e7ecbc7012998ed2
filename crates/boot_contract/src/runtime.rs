//! Contracts for the host environment, the application runtime, and startup tasks.

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::{flags::BootFlags, flags::WindowSize, ports::AppHandle};

/// Synchronous queries against the host environment made during boot.
pub trait HostEnvironment {
    /// Element type the application mounts into.
    type Node;

    /// Current unix time in milliseconds.
    fn now_unix_ms(&self) -> u64;

    /// Current viewport dimensions.
    fn viewport_size(&self) -> WindowSize;

    /// Looks up the element with DOM id `element_id`.
    fn mount_target(&self, element_id: &str) -> Option<Self::Node>;
}

/// Arguments of the application runtime's init entry point.
pub struct InitConfig<N> {
    /// Element the application renders into.
    pub node: N,
    /// Boot-time environment snapshot.
    pub flags: BootFlags,
}

/// Application runtime that can be started once per mount node.
pub trait AppRuntime<N> {
    /// Handle returned for the running instance.
    type Handle: AppHandle;

    /// Starts the application.
    ///
    /// # Errors
    ///
    /// Returns a message when the runtime cannot start on `config.node`.
    fn init(&self, config: InitConfig<N>) -> Result<Self::Handle, String>;
}

/// Boxed future of a detached startup task.
pub type StartupTaskFuture = LocalBoxFuture<'static, Result<(), String>>;

/// One-shot auxiliary task launched after the application starts.
pub trait StartupTask {
    /// Stable name used in log lines.
    fn name(&self) -> &'static str;

    /// Builds the task future. The result is never awaited by the boot path.
    fn start(&self) -> StartupTaskFuture;
}

/// Launches a detached local future on the host's event loop.
pub type TaskSpawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;
