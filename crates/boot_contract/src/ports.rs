//! Port messages exchanged between a running application and the host.
//!
//! Ports carry JSON objects tagged by `kind`. The host only interprets the storage kinds; any
//! other outbound traffic belongs to the application and is left alone.

use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

thread_local! {
    static LAST_INSTANCE_ID: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Process-unique identifier of a running application instance.
pub struct AppInstanceId(pub u64);

impl std::fmt::Display for AppInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates the next [`AppInstanceId`] for this process.
pub fn next_instance_id() -> AppInstanceId {
    LAST_INSTANCE_ID.with(|last| {
        let next = last.get().saturating_add(1);
        last.set(next);
        AppInstanceId(next)
    })
}

/// Listener registered on an application's outbound port.
pub type OutboundListener = Box<dyn FnMut(Value)>;

/// Sender delivering messages into an application's inbound port.
pub type InboundSender = Rc<dyn Fn(Value)>;

/// Handle to a running application instance, owned by the application runtime.
///
/// Holders must not assume they control the instance's lifetime.
pub trait AppHandle {
    /// Identifier of the running instance.
    fn instance_id(&self) -> AppInstanceId;

    /// Registers a listener called for every outbound port message, in emission order.
    fn subscribe_outbound(&self, listener: OutboundListener);

    /// Returns a sender for the application's inbound port.
    fn inbound_sender(&self) -> InboundSender;
}

const STORAGE_WRITE: &str = "storage-write";
const STORAGE_READ: &str = "storage-read";
const STORAGE_REMOVE: &str = "storage-remove";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
/// Storage operation requested by the application.
pub enum StorageRequest {
    /// Persist `value` under `key`.
    #[serde(rename = "storage-write")]
    Write {
        /// Target key.
        key: String,
        /// Value to persist.
        value: String,
        /// Optional id echoed back if the write fails.
        #[serde(default, rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<i64>,
    },
    /// Read `key` and answer with [`StorageResponse::ReadResult`].
    #[serde(rename = "storage-read")]
    Read {
        /// Key to read.
        key: String,
        /// Correlation id echoed in the response.
        #[serde(rename = "requestId")]
        request_id: i64,
    },
    /// Remove `key`.
    #[serde(rename = "storage-remove")]
    Remove {
        /// Key to remove.
        key: String,
        /// Optional id echoed back if the removal fails.
        #[serde(default, rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<i64>,
    },
}

impl StorageRequest {
    /// Key the request targets.
    pub fn key(&self) -> &str {
        match self {
            Self::Write { key, .. } | Self::Read { key, .. } | Self::Remove { key, .. } => key,
        }
    }

    /// Correlation id carried by the request, if any.
    pub fn request_id(&self) -> Option<i64> {
        match self {
            Self::Read { request_id, .. } => Some(*request_id),
            Self::Write { request_id, .. } | Self::Remove { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
/// Message the host delivers to the application's inbound port.
pub enum StorageResponse {
    /// Answer to a [`StorageRequest::Read`]; `value` is `null` when the key is absent.
    #[serde(rename = "storage-read-result")]
    ReadResult {
        /// Id of the originating read.
        #[serde(rename = "requestId")]
        request_id: i64,
        /// Stored value.
        value: Option<String>,
    },
    /// A storage operation failed.
    #[serde(rename = "storage-error")]
    Error {
        /// Id of the originating request, `null` when it carried none.
        #[serde(rename = "requestId")]
        request_id: Option<i64>,
        /// Key the failed request targeted, absent when the request named none.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Human-readable failure reason.
        reason: String,
    },
    /// Another instance changed the shared store.
    #[serde(rename = "storage-changed")]
    Changed {
        /// Changed key.
        key: String,
        /// New value, `null` when removed.
        value: Option<String>,
    },
}

impl StorageResponse {
    /// Serializes the response into a port message.
    pub fn to_port_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed {kind} message: {reason}")]
/// A message of a storage kind whose fields do not decode.
pub struct MalformedStorageMessage {
    /// Storage kind the message claimed.
    pub kind: String,
    /// Integer `requestId` found on the message, if any.
    pub request_id: Option<i64>,
    /// String `key` found on the message, if any.
    pub key: Option<String>,
    /// Decoder failure.
    pub reason: String,
}

impl MalformedStorageMessage {
    /// Error response owed to the application, when the message carried a usable id.
    pub fn to_response(&self) -> Option<StorageResponse> {
        self.request_id.map(|request_id| StorageResponse::Error {
            request_id: Some(request_id),
            key: self.key.clone(),
            reason: self.to_string(),
        })
    }
}

/// Extracts a storage request from an outbound port message.
///
/// Returns `Ok(None)` for messages of any other kind.
///
/// # Errors
///
/// Returns [`MalformedStorageMessage`] when the message claims a storage kind but its fields do
/// not decode.
pub fn parse_storage_request(
    message: &Value,
) -> Result<Option<StorageRequest>, MalformedStorageMessage> {
    let kind = match message.get("kind").and_then(Value::as_str) {
        Some(kind @ (STORAGE_WRITE | STORAGE_READ | STORAGE_REMOVE)) => kind,
        _ => return Ok(None),
    };
    serde_json::from_value(message.clone())
        .map(Some)
        .map_err(|e| MalformedStorageMessage {
            kind: kind.to_string(),
            request_id: message.get("requestId").and_then(Value::as_i64),
            key: message.get("key").and_then(Value::as_str).map(str::to_string),
            reason: e.to_string(),
        })
}
