// ABOUTME: Defines Payload, the single storage handle for an attachment's binary content.
// ABOUTME: A payload is either inlined into the snapshot (base64) or referenced by blob store key.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Where the bytes of an image diagram or a document live.
///
/// `Referenced` is the normal path: the bytes sit in the blob store under
/// `file_id`. `Inline` is the degraded path used when the blob store is
/// unavailable or the write failed; the bytes travel inside the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "storage", rename_all = "snake_case")]
pub enum Payload {
    Inline {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Referenced {
        file_id: Ulid,
    },
}

impl Payload {
    pub fn inline(data: Vec<u8>) -> Self {
        Self::Inline { data }
    }

    pub fn referenced(file_id: Ulid) -> Self {
        Self::Referenced { file_id }
    }

    /// The blob store key, if the bytes live in the blob store.
    pub fn file_id(&self) -> Option<Ulid> {
        match self {
            Self::Referenced { file_id } => Some(*file_id),
            Self::Inline { .. } => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

/// Serde adapter storing raw bytes as standard base64 text.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
