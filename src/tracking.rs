//! Vocabulary shared with the tracking engine: handles, orders, entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::handle::{Handle, write_quoted};
use crate::hls::CheckError;

/// A handle as the engine stores it. The engine may also hold handles minted
/// by other crawlers, which this crate never checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackedHandle {
    Hls(Handle),
    Foreign { source: String, key: String },
}

impl TrackedHandle {
    pub fn as_hls(&self) -> Option<&Handle> {
        match self {
            TrackedHandle::Hls(handle) => Some(handle),
            TrackedHandle::Foreign { .. } => None,
        }
    }
}

impl From<Handle> for TrackedHandle {
    fn from(handle: Handle) -> Self {
        TrackedHandle::Hls(handle)
    }
}

impl fmt::Display for TrackedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackedHandle::Hls(handle) => fmt::Display::fmt(handle, f),
            TrackedHandle::Foreign { source, key } => {
                write!(f, "{{{}:", source)?;
                write_quoted(f, key)?;
                f.write_str("}")
            }
        }
    }
}

/// Liveness record persisted by the engine between checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    pub live: bool,
}

impl EntityData {
    /// Reads the record from persisted data; absent or foreign-shaped data yields the default.
    pub fn load(data: Option<&Value>) -> Self {
        data.and_then(|value| EntityData::deserialize(value).ok())
            .unwrap_or_default()
    }
}

impl From<EntityData> for Value {
    fn from(data: EntityData) -> Self {
        serde_json::json!({ "live": data.live })
    }
}

/// Engine record pairing a handle with its persisted state
#[derive(Debug, Clone)]
pub struct Entity {
    pub handle: TrackedHandle,
    pub data: Option<Value>,
}

impl Entity {
    pub fn new(handle: impl Into<TrackedHandle>) -> Self {
        Self {
            handle: handle.into(),
            data: None,
        }
    }

    pub fn live(&self) -> bool {
        EntityData::load(self.data.as_ref()).live
    }
}

/// Scheduling directive issued by the engine
#[derive(Debug, Clone)]
pub enum Order {
    Track(TrackedHandle),
    Untrack(TrackedHandle),
}

impl Order {
    pub fn handle(&self) -> &TrackedHandle {
        match self {
            Order::Track(handle) | Order::Untrack(handle) => handle,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("invalid handle")]
    InvalidHandle,

    #[error("check stream: {0}")]
    Check(#[from] CheckError),
}

impl TrackingError {
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, TrackingError::InvalidHandle)
    }
}
