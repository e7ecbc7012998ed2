use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use boot_contract::{
    next_instance_id, AppHandle, AppInstanceId, AppRuntime, BootError, HostEnvironment,
    InboundSender, InitConfig, MemoryStorage, MountError, OutboundListener, StorageAdapter,
    WindowSize,
};
use boot_runtime::{start_app, BootConfig, BridgeState, StorageBridge};
use futures::future::LocalBoxFuture;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// In-process stand-in for an application instance and its ports.
#[derive(Clone)]
struct PortedApp {
    id: AppInstanceId,
    listeners: Rc<RefCell<Vec<OutboundListener>>>,
    inbox: Rc<RefCell<Vec<Value>>>,
}

impl PortedApp {
    fn new() -> Self {
        Self {
            id: next_instance_id(),
            listeners: Rc::default(),
            inbox: Rc::default(),
        }
    }

    fn emit(&self, message: Value) {
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(message.clone());
        }
    }

    fn inbox(&self) -> Vec<Value> {
        self.inbox.borrow().clone()
    }
}

impl AppHandle for PortedApp {
    fn instance_id(&self) -> AppInstanceId {
        self.id
    }

    fn subscribe_outbound(&self, listener: OutboundListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn inbound_sender(&self) -> InboundSender {
        let inbox = self.inbox.clone();
        Rc::new(move |message: Value| inbox.borrow_mut().push(message))
    }
}

struct PageHost {
    viewport: WindowSize,
    has_root: bool,
}

impl HostEnvironment for PageHost {
    type Node = &'static str;

    fn now_unix_ms(&self) -> u64 {
        42
    }

    fn viewport_size(&self) -> WindowSize {
        self.viewport
    }

    fn mount_target(&self, element_id: &str) -> Option<&'static str> {
        (self.has_root && element_id == "root").then_some("root")
    }
}

/// Host whose viewport can change after boot.
struct ResizingHost {
    viewport: Rc<Cell<WindowSize>>,
}

impl HostEnvironment for ResizingHost {
    type Node = &'static str;

    fn now_unix_ms(&self) -> u64 {
        42
    }

    fn viewport_size(&self) -> WindowSize {
        self.viewport.get()
    }

    fn mount_target(&self, _element_id: &str) -> Option<&'static str> {
        Some("root")
    }
}

struct PortedRuntime {
    app: PortedApp,
}

impl AppRuntime<&'static str> for PortedRuntime {
    type Handle = PortedApp;

    fn init(&self, _config: InitConfig<&'static str>) -> Result<PortedApp, String> {
        Ok(self.app.clone())
    }
}

fn quiet_config() -> BootConfig {
    BootConfig {
        service_worker_url: None,
        ..BootConfig::default()
    }
}

fn inline_spawner() -> boot_contract::TaskSpawner {
    Rc::new(|task: LocalBoxFuture<'static, ()>| futures::executor::block_on(task))
}

#[test]
fn write_from_app_is_visible_in_storage() {
    let storage = MemoryStorage::default();
    let app = PortedApp::new();
    let bridge = StorageBridge::new(Rc::new(storage.clone()));
    bridge.bind(&app).expect("bind");

    app.emit(json!({"kind": "storage-write", "key": "foo", "value": "bar"}));

    assert_eq!(storage.get("foo").expect("get"), Some("bar".to_string()));
    assert!(app.inbox().is_empty());
}

#[test]
fn read_of_missing_key_answers_with_null_value() {
    let app = PortedApp::new();
    let bridge = StorageBridge::new(Rc::new(MemoryStorage::default()));
    bridge.bind(&app).expect("bind");

    app.emit(json!({"kind": "storage-read", "key": "missing", "requestId": 7}));

    assert_eq!(
        app.inbox(),
        vec![json!({"kind": "storage-read-result", "requestId": 7, "value": null})]
    );
}

#[test]
fn second_bind_is_rejected_and_first_binding_keeps_relaying() {
    let storage = MemoryStorage::default();
    let app = PortedApp::new();
    let other = PortedApp::new();
    let bridge = StorageBridge::new(Rc::new(storage.clone()));

    bridge.bind(&app).expect("first bind");
    let err = bridge.bind(&app).expect_err("second bind on same handle");
    assert_eq!(err.bound_to, app.instance_id());
    let err = bridge.bind(&other).expect_err("bind on another handle");
    assert_eq!(err.bound_to, app.instance_id());
    assert_eq!(bridge.state(), BridgeState::Bound(app.instance_id()));

    app.emit(json!({"kind": "storage-write", "key": "k", "value": "v"}));
    app.emit(json!({"kind": "storage-read", "key": "k", "requestId": 1}));

    // Exactly one listener, so exactly one answer.
    assert_eq!(app.listeners.borrow().len(), 1);
    assert_eq!(
        app.inbox(),
        vec![json!({"kind": "storage-read-result", "requestId": 1, "value": "v"})]
    );
    assert!(other.listeners.borrow().is_empty());
}

#[test]
fn storage_failures_are_reported_per_request_and_relay_continues() {
    let storage = MemoryStorage::with_capacity_bytes(16);
    let app = PortedApp::new();
    let bridge = StorageBridge::new(Rc::new(storage.clone()));
    bridge.bind(&app).expect("bind");

    app.emit(json!({
        "kind": "storage-write",
        "key": "blob",
        "value": "far too large for this store",
        "requestId": 9
    }));
    app.emit(json!({"kind": "storage-write", "key": "a", "value": "b"}));
    app.emit(json!({"kind": "storage-read", "key": "a", "requestId": 10}));

    assert_eq!(
        app.inbox(),
        vec![
            json!({
                "kind": "storage-error",
                "requestId": 9,
                "key": "blob",
                "reason": "storage quota exceeded while writing `blob`"
            }),
            json!({"kind": "storage-read-result", "requestId": 10, "value": "b"}),
        ]
    );
}

#[test]
fn malformed_and_foreign_messages_are_ignored() {
    let storage = MemoryStorage::default();
    let app = PortedApp::new();
    StorageBridge::new(Rc::new(storage.clone()))
        .bind(&app)
        .expect("bind");

    app.emit(json!({"kind": "storage-read", "key": "k"}));
    app.emit(json!({"kind": "navigate", "to": "/account"}));
    app.emit(json!(null));
    app.emit(json!({"kind": "storage-remove", "key": "never-set"}));

    assert!(app.inbox().is_empty());
    assert!(storage.is_empty());
}

#[test]
fn every_integer_request_id_gets_an_answer() {
    let app = PortedApp::new();
    StorageBridge::new(Rc::new(MemoryStorage::with_entries([("k", "v")])))
        .bind(&app)
        .expect("bind");

    app.emit(json!({"kind": "storage-read", "key": "k", "requestId": -1}));
    app.emit(json!({"kind": "storage-read", "requestId": 5}));

    let inbox = app.inbox();
    assert_eq!(inbox.len(), 2);
    assert_eq!(
        inbox[0],
        json!({"kind": "storage-read-result", "requestId": -1, "value": "v"})
    );
    assert_eq!(inbox[1]["kind"], json!("storage-error"));
    assert_eq!(inbox[1]["requestId"], json!(5));
    assert!(inbox[1]["reason"]
        .as_str()
        .expect("reason")
        .starts_with("malformed storage-read message"));
}

#[test]
fn external_changes_are_pushed_only_when_enabled() {
    let storage = MemoryStorage::default();
    let forwarding = PortedApp::new();
    StorageBridge::new(Rc::new(storage.clone()))
        .bind(&forwarding)
        .expect("bind");

    let silent = PortedApp::new();
    StorageBridge::new(Rc::new(storage.clone()))
        .forward_external_changes(false)
        .bind(&silent)
        .expect("bind");

    storage.apply_external_change("jhi-authenticationToken", Some("fresh"));
    storage.apply_external_change("jhi-authenticationToken", None);

    assert_eq!(
        forwarding.inbox(),
        vec![
            json!({"kind": "storage-changed", "key": "jhi-authenticationToken", "value": "fresh"}),
            json!({"kind": "storage-changed", "key": "jhi-authenticationToken", "value": null}),
        ]
    );
    assert!(silent.inbox().is_empty());
}

#[test]
fn start_app_boots_with_stored_token_and_binds_storage() {
    let storage = MemoryStorage::with_entries([("jhi-authenticationToken", "abc123")]);
    let runtime = PortedRuntime {
        app: PortedApp::new(),
    };
    let host = PageHost {
        viewport: WindowSize::new(800, 600),
        has_root: true,
    };

    let started = start_app(
        quiet_config(),
        host,
        Rc::new(storage.clone()),
        inline_spawner(),
        &runtime,
    )
    .expect("start");

    assert_eq!(started.flags.auth_token(), Some("abc123"));
    assert_eq!(started.flags.window_size(), WindowSize::new(800, 600));
    assert_eq!(
        serde_json::to_value(started.flags.to_wire()).expect("wire flags"),
        json!({
            "currentTime": 42,
            "windowSize": {"width": 800, "height": 600},
            "jwtToken": "abc123"
        })
    );
    assert_eq!(
        started.bridge.state(),
        BridgeState::Bound(started.handle.instance_id())
    );

    started
        .handle
        .emit(json!({"kind": "storage-remove", "key": "jhi-authenticationToken"}));
    assert_eq!(storage.get("jhi-authenticationToken").expect("get"), None);
}

#[test]
fn start_app_without_mount_target_halts_startup() {
    let app = PortedApp::new();
    let runtime = PortedRuntime { app: app.clone() };
    let host = PageHost {
        viewport: WindowSize::new(800, 600),
        has_root: false,
    };

    let err = start_app(
        quiet_config(),
        host,
        Rc::new(MemoryStorage::default()),
        inline_spawner(),
        &runtime,
    )
    .err()
    .expect("mount should fail");

    assert_eq!(
        err,
        BootError::Mount(MountError {
            element_id: "root".to_string()
        })
    );
    assert!(app.listeners.borrow().is_empty());
}

#[test]
fn boot_flags_keep_the_boot_time_viewport_after_resizes() {
    let viewport = Rc::new(Cell::new(WindowSize::new(800, 600)));
    let runtime = PortedRuntime {
        app: PortedApp::new(),
    };
    let host = ResizingHost {
        viewport: viewport.clone(),
    };

    let started = start_app(
        quiet_config(),
        host,
        Rc::new(MemoryStorage::default()),
        inline_spawner(),
        &runtime,
    )
    .expect("start");
    viewport.set(WindowSize::new(375, 812));

    assert_eq!(started.flags.window_size(), WindowSize::new(800, 600));
    assert_eq!(
        started.flags.to_wire().window_size,
        WindowSize::new(800, 600)
    );
}
