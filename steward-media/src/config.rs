/// Configuration for media upload operations.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Absolute max size allowed for a single image blob (safety guard).
    pub max_blob_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 25 * 1024 * 1024, // 25MB, plenty for a phone photo
        }
    }
}

impl MediaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }
}
