//! Byte-string destinations with no std counterpart.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Opaque binary content, stored exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawContent(pub Vec<u8>);

impl RawContent {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for RawContent {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for RawContent {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

/// An encoded JSON document kept undecoded until the caller asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RawMessage(pub Vec<u8>);

impl RawMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode the message.
    pub fn to_json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.0)
    }
}

impl Deref for RawMessage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for RawMessage {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_decodes() {
        let message = RawMessage::from(r#"{"id": 3}"#);
        let decoded: serde_json::Value = message.to_json().unwrap();
        assert_eq!(decoded["id"], 3);
        assert!(RawMessage::from("{").to_json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_raw_content_serializes_as_bytes() {
        let content = RawContent::from("ab");
        assert_eq!(serde_json::to_string(&content).unwrap(), "[97,98]");
        assert_eq!(&*content, b"ab");
    }
}
