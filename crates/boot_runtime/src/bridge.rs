//! Storage bridge relaying application port messages to a [`StorageAdapter`].
//!
//! Each outbound message is handled to completion before the next one: storage calls are
//! synchronous and the host event loop is single-threaded. Storage failures are answered
//! per request and never stop the relay. A malformed storage message is answered with an
//! error when it carries an integer `requestId`, and dropped otherwise.

use std::{cell::Cell, rc::Rc};

use boot_contract::{
    parse_storage_request, AppHandle, AppInstanceId, DoubleBindError, InboundSender,
    StorageAdapter, StorageChange, StorageRequest, StorageResponse,
};
use leptos::logging;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Binding state of a [`StorageBridge`].
pub enum BridgeState {
    /// No application is attached.
    Unbound,
    /// Relaying for the given instance until process exit.
    Bound(AppInstanceId),
}

/// Connects one running application to persistent storage.
pub struct StorageBridge {
    storage: Rc<dyn StorageAdapter>,
    forward_external_changes: bool,
    state: Cell<BridgeState>,
}

impl StorageBridge {
    /// Creates an unbound bridge that forwards external changes once bound.
    pub fn new(storage: Rc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            forward_external_changes: true,
            state: Cell::new(BridgeState::Unbound),
        }
    }

    /// Enables or disables pushing changes made by other instances into the application.
    pub fn forward_external_changes(mut self, enabled: bool) -> Self {
        self.forward_external_changes = enabled;
        self
    }

    /// Current binding state.
    pub fn state(&self) -> BridgeState {
        self.state.get()
    }

    /// Attaches the storage relay to `handle` for the rest of the process.
    ///
    /// The bridge keeps only the handle's inbound sender, never the handle itself.
    ///
    /// # Errors
    ///
    /// Returns [`DoubleBindError`] when the bridge is already bound; the existing binding keeps
    /// relaying unchanged.
    pub fn bind<H: AppHandle + ?Sized>(&self, handle: &H) -> Result<(), DoubleBindError> {
        if let BridgeState::Bound(bound_to) = self.state.get() {
            return Err(DoubleBindError { bound_to });
        }
        let instance = handle.instance_id();
        self.state.set(BridgeState::Bound(instance));

        let storage = self.storage.clone();
        let inbound = handle.inbound_sender();
        handle.subscribe_outbound(Box::new(move |message: Value| {
            handle_outbound(storage.as_ref(), &inbound, &message);
        }));

        if self.forward_external_changes {
            let inbound = handle.inbound_sender();
            let observing = self.storage.subscribe_changes(Box::new(move |change: StorageChange| {
                inbound(
                    StorageResponse::Changed {
                        key: change.key,
                        value: change.value,
                    }
                    .to_port_value(),
                );
            }));
            if !observing {
                logging::log!("storage backend cannot observe external changes; not forwarding");
            }
        }

        Ok(())
    }
}

fn handle_outbound(storage: &dyn StorageAdapter, inbound: &InboundSender, message: &Value) {
    let request = match parse_storage_request(message) {
        Ok(Some(request)) => request,
        Ok(None) => return,
        Err(err) => {
            // A usable requestId means the application is waiting on an answer.
            match err.to_response() {
                Some(response) => {
                    logging::warn!("rejecting storage port message: {err}");
                    inbound(response.to_port_value());
                }
                None => logging::warn!("dropping storage port message: {err}"),
            }
            return;
        }
    };
    if let Some(response) = relay_storage_request(storage, request) {
        inbound(response.to_port_value());
    }
}

/// Executes one storage request, returning the message owed to the application, if any.
///
/// Successful writes and removals are silent; reads always answer; failures answer with
/// [`StorageResponse::Error`] tagged with the request id.
pub fn relay_storage_request(
    storage: &dyn StorageAdapter,
    request: StorageRequest,
) -> Option<StorageResponse> {
    let request_id = request.request_id();
    let result = match &request {
        StorageRequest::Write { key, value, .. } => storage.set(key, value).map(|()| None),
        StorageRequest::Remove { key, .. } => storage.remove(key).map(|()| None),
        StorageRequest::Read { key, request_id } => storage.get(key).map(|value| {
            Some(StorageResponse::ReadResult {
                request_id: *request_id,
                value,
            })
        }),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            logging::warn!("storage relay for `{}` failed: {err}", request.key());
            Some(StorageResponse::Error {
                request_id,
                key: Some(request.key().to_string()),
                reason: err.to_string(),
            })
        }
    }
}
