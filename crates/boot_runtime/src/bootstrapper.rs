//! Boot sequence: capture [`BootFlags`], start the application runtime, launch startup tasks.

use std::rc::Rc;

use boot_contract::{
    AppRuntime, BootError, BootFlags, HostEnvironment, InitConfig, MountError, StartupTask,
    StorageAdapter, TaskSpawner,
};
use leptos::logging;

use crate::config::BootConfig;

/// Running application returned by a successful boot.
pub struct BootedApp<H> {
    /// Flags the application was started with.
    pub flags: BootFlags,
    /// Handle to the running instance.
    pub handle: H,
}

/// One-shot application starter.
///
/// [`AppBootstrapper::boot`] consumes the bootstrapper, so flags are captured at most once.
pub struct AppBootstrapper<E: HostEnvironment> {
    config: BootConfig,
    host: E,
    storage: Rc<dyn StorageAdapter>,
    spawner: TaskSpawner,
    startup_tasks: Vec<Box<dyn StartupTask>>,
}

impl<E: HostEnvironment> AppBootstrapper<E> {
    /// Creates a bootstrapper with no startup tasks.
    pub fn new(
        config: BootConfig,
        host: E,
        storage: Rc<dyn StorageAdapter>,
        spawner: TaskSpawner,
    ) -> Self {
        Self {
            config,
            host,
            storage,
            spawner,
            startup_tasks: Vec::new(),
        }
    }

    /// Adds a task launched, detached, after the application starts.
    pub fn with_startup_task(mut self, task: impl StartupTask + 'static) -> Self {
        self.startup_tasks.push(Box::new(task));
        self
    }

    /// Boots the application on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Mount`] when the mount target is missing (the runtime is never
    /// initialized) and [`BootError::Init`] when the runtime refuses to start.
    pub fn boot<R: AppRuntime<E::Node>>(
        self,
        runtime: &R,
    ) -> Result<BootedApp<R::Handle>, BootError> {
        let flags = capture_boot_flags(
            &self.host,
            self.storage.as_ref(),
            &self.config.auth_token_key,
        );

        let node = self
            .host
            .mount_target(&self.config.mount_element_id)
            .ok_or_else(|| MountError {
                element_id: self.config.mount_element_id.clone(),
            })?;
        let handle = runtime
            .init(InitConfig {
                node,
                flags: flags.clone(),
            })
            .map_err(BootError::Init)?;
        logging::log!(
            "application started in #{} ({}x{})",
            self.config.mount_element_id,
            flags.window_size().width,
            flags.window_size().height
        );

        for task in &self.startup_tasks {
            launch_startup_task(&self.spawner, task.as_ref());
        }

        Ok(BootedApp { flags, handle })
    }
}

/// Captures the boot snapshot: clock first, then viewport, then the stored auth token.
pub fn capture_boot_flags<E: HostEnvironment + ?Sized>(
    host: &E,
    storage: &dyn StorageAdapter,
    auth_token_key: &str,
) -> BootFlags {
    let current_time_unix_ms = host.now_unix_ms();
    let window_size = host.viewport_size();
    let auth_token = read_auth_token(storage, auth_token_key);
    BootFlags::new(current_time_unix_ms, window_size, auth_token)
}

fn read_auth_token(storage: &dyn StorageAdapter, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(token) => token,
        Err(err) => {
            logging::warn!("auth token read from `{key}` failed, booting signed out: {err}");
            None
        }
    }
}

fn launch_startup_task(spawner: &TaskSpawner, task: &dyn StartupTask) {
    let name = task.name();
    let future = task.start();
    spawner(Box::pin(async move {
        if let Err(err) = future.await {
            logging::error!("startup task `{name}` failed: {err}");
        }
    }));
}
