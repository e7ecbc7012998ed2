//! Port plumbing between the Leptos application and the host bridge.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use boot_contract::{
    next_instance_id, AppHandle, AppInstanceId, InboundSender, OutboundListener, StorageResponse,
};
use leptos::logging;
use serde_json::{json, Value};

#[derive(Default)]
struct PortState {
    listeners: Vec<OutboundListener>,
    pending: VecDeque<Value>,
    emitting: bool,
    inbound_watchers: Vec<Rc<dyn Fn(&Value)>>,
}

#[derive(Clone)]
/// Outbound and inbound ports of one running application instance.
pub struct SitePorts {
    id: AppInstanceId,
    state: Rc<RefCell<PortState>>,
}

impl Default for SitePorts {
    fn default() -> Self {
        Self {
            id: next_instance_id(),
            state: Rc::default(),
        }
    }
}

impl SitePorts {
    /// Sends a message on the outbound port to every subscribed listener.
    ///
    /// Messages emitted from inside a listener are queued and sent, in order, once the current
    /// message has reached every listener.
    pub fn emit(&self, message: Value) {
        {
            let mut state = self.state.borrow_mut();
            state.pending.push_back(message);
            if state.emitting {
                return;
            }
            state.emitting = true;
        }

        loop {
            // Listeners are taken out while running so a listener may deliver inbound messages.
            let (message, mut listeners) = {
                let mut state = self.state.borrow_mut();
                let Some(message) = state.pending.pop_front() else {
                    state.emitting = false;
                    return;
                };
                (message, std::mem::take(&mut state.listeners))
            };
            for listener in &mut listeners {
                listener(message.clone());
            }
            let mut state = self.state.borrow_mut();
            listeners.append(&mut state.listeners);
            state.listeners = listeners;
        }
    }

    /// Asks the host to persist `value` under `key`.
    pub fn write(&self, key: &str, value: &str) {
        self.emit(json!({"kind": "storage-write", "key": key, "value": value}));
    }

    /// Asks the host to remove `key`.
    pub fn remove(&self, key: &str) {
        self.emit(json!({"kind": "storage-remove", "key": key}));
    }

    /// Asks the host to read `key`; the answer arrives on the inbound port.
    pub fn read(&self, key: &str, request_id: i64) {
        self.emit(json!({"kind": "storage-read", "key": key, "requestId": request_id}));
    }

    /// Registers a watcher for inbound messages.
    pub fn on_inbound(&self, watcher: impl Fn(&Value) + 'static) {
        self.state
            .borrow_mut()
            .inbound_watchers
            .push(Rc::new(watcher));
    }

    fn deliver(&self, message: Value) {
        let watchers = self.state.borrow().inbound_watchers.clone();
        for watcher in watchers {
            watcher(&message);
        }
    }
}

impl AppHandle for SitePorts {
    fn instance_id(&self) -> AppInstanceId {
        self.id
    }

    fn subscribe_outbound(&self, listener: OutboundListener) {
        self.state.borrow_mut().listeners.push(listener);
    }

    fn inbound_sender(&self) -> InboundSender {
        let ports = self.clone();
        Rc::new(move |message: Value| {
            if let Ok(StorageResponse::Error { key, reason, .. }) =
                serde_json::from_value::<StorageResponse>(message.clone())
            {
                let key = key.as_deref().unwrap_or("<none>");
                logging::warn!("storage request for `{key}` failed: {reason}");
            }
            ports.deliver(message);
        })
    }
}
