//! Process entry wiring: boot the application, then attach the storage bridge.

use std::rc::Rc;

use boot_contract::{
    AppRuntime, BootError, BootFlags, HostEnvironment, StorageAdapter, TaskSpawner,
};
use boot_host_web::{
    host_strategy_name, local_task_spawner, storage_adapter, MountNode, ServiceWorkerRegistration,
    WebHostEnvironment,
};
use leptos::logging;

use crate::{bootstrapper::AppBootstrapper, bridge::StorageBridge, config::BootConfig};

/// Application started and connected to storage.
pub struct StartedApp<H> {
    /// Flags the application was started with.
    pub flags: BootFlags,
    /// Handle to the running instance.
    pub handle: H,
    /// Bridge bound to `handle`.
    pub bridge: StorageBridge,
}

/// Boots the application on `runtime` and binds a fresh storage bridge to it.
///
/// # Errors
///
/// Returns the [`BootError`] that halted startup.
pub fn start_app<E, R>(
    config: BootConfig,
    host: E,
    storage: Rc<dyn StorageAdapter>,
    spawner: TaskSpawner,
    runtime: &R,
) -> Result<StartedApp<R::Handle>, BootError>
where
    E: HostEnvironment,
    R: AppRuntime<E::Node>,
{
    let forward_external_changes = config.forward_external_changes;
    let service_worker_url = config.service_worker_url.clone();

    let mut bootstrapper = AppBootstrapper::new(config, host, storage.clone(), spawner);
    if let Some(url) = service_worker_url {
        bootstrapper = bootstrapper.with_startup_task(ServiceWorkerRegistration::new(url));
    }
    let booted = bootstrapper.boot(runtime)?;

    let bridge = StorageBridge::new(storage).forward_external_changes(forward_external_changes);
    bridge.bind(&booted.handle)?;

    Ok(StartedApp {
        flags: booted.flags,
        handle: booted.handle,
        bridge,
    })
}

/// Starts the application in the current page with the browser host adapters.
///
/// # Errors
///
/// Returns the [`BootError`] that halted startup.
pub fn start_browser_app<R>(runtime: &R) -> Result<StartedApp<R::Handle>, BootError>
where
    R: AppRuntime<MountNode>,
{
    let config = BootConfig::from_current_location();
    logging::log!("booting with {} storage", host_strategy_name());
    start_app(
        config,
        WebHostEnvironment,
        Rc::new(storage_adapter()),
        local_task_spawner(),
        runtime,
    )
}
