//! JSON façade for the document tree.
//!
//! Every field keeps its field-table name in camelCase; image blobs travel
//! base64-encoded under the `imageData` key and round-trip losslessly with
//! the binary form.

use crate::File;
use crate::error::IclError;

impl File {
    /// Decode a document tree from its JSON representation.
    pub fn from_json(bytes: &[u8]) -> Result<File, IclError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode this document tree as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, IclError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// serde adapter putting raw bytes on the JSON wire as standard base64.
pub(crate) mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
