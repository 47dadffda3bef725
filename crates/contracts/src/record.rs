//! Record - the unit of data moved from sources to sinks

use bytes::Bytes;

/// Opaque log record
///
/// The payload is never interpreted. Cloning is a reference-count bump, so
/// fanning one record out to several sinks shares the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    payload: Bytes,
}

impl Record {
    /// Create a record from any byte container
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Raw payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consume the record, returning the shared payload
    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

impl From<Bytes> for Record {
    fn from(payload: Bytes) -> Self {
        Self::new(payload)
    }
}

impl From<Vec<u8>> for Record {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<&'static str> for Record {
    fn from(payload: &'static str) -> Self {
        Self::new(payload)
    }
}

impl From<String> for Record {
    fn from(payload: String) -> Self {
        Self::new(payload)
    }
}
