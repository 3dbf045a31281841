//! Transport message type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A transport message: unique string header keys plus an opaque payload.
///
/// Header insertion order is not significant; the outbox only ever reads
/// and writes individual keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message headers.
    pub headers: HashMap<String, String>,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message with no headers.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            payload: payload.into(),
        }
    }

    /// Create a message with the given headers.
    pub fn with_headers(headers: HashMap<String, String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            payload: payload.into(),
        }
    }
}
