use bytes::Bytes;
use serde::{Deserialize, Serialize};
use steward_core::UserAddress;
use uuid::Uuid;

/// Stable identifier for an uploaded image blob, returned by the
/// content-addressed store as an upload primitive returning an immutable
/// identifier. The Encoder embeds these in the submission payload; nothing
/// else about the store's key scheme leaks past this newtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context for a media operation: who is uploading, for request tracing.
#[derive(Debug, Clone)]
pub struct MediaCtx {
    pub user_address: UserAddress,
    pub request_id: String,
}

impl MediaCtx {
    pub fn new(user_address: UserAddress) -> Self {
        Self {
            user_address,
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

/// A single image blob as carried on a draft or a job, prior to upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBlob {
    pub bytes: Bytes,
    pub content_type: String,
}

impl ImageBlob {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}
