use std::sync::Arc;

use tracing::{instrument, warn};

use crate::{
    ImageBlob, MediaConfig, MediaError, MediaReceipt, MediaResult, store::ContentStore,
};

/// Coordinates image upload for the submission core. This is the thing the
/// JobRunner's Upload step calls: one image at a time with `upload`, or
/// `upload_all` for a batch, which uploads sequentially and preserves the
/// caller's ordering in the returned receipts so they line up 1:1 with the
/// input images.
pub struct MediaUploader {
    store: Arc<dyn ContentStore>,
    config: MediaConfig,
}

impl MediaUploader {
    pub fn new<S: ContentStore + 'static>(store: S, config: MediaConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Upload a single image, returning a receipt with its stable id.
    #[instrument(skip(self, image), fields(content_type = %image.content_type))]
    pub async fn upload(&self, image: &ImageBlob) -> MediaResult<MediaReceipt> {
        let size = image.bytes.len() as u64;
        if size > self.config.max_blob_bytes {
            return Err(MediaError::permanent(format!(
                "image size {} exceeds maximum {}",
                size, self.config.max_blob_bytes
            )));
        }

        let result = self
            .store
            .put(image.bytes.clone(), Some(&image.content_type))
            .await?;

        Ok(MediaReceipt::new(
            result.id,
            result.size_bytes,
            Some(image.content_type.clone()),
            chrono::Utc::now(),
        ))
    }

    /// Upload every image in order, stopping at the first failure. Callers
    /// that need resumability (the JobRunner does) should track which
    /// indices already succeeded externally and only pass the remainder
    /// back in on retry.
    pub async fn upload_all(&self, images: &[ImageBlob]) -> MediaResult<Vec<MediaReceipt>> {
        let mut receipts = Vec::with_capacity(images.len());
        for (idx, image) in images.iter().enumerate() {
            match self.upload(image).await {
                Ok(receipt) => receipts.push(receipt),
                Err(err) => {
                    warn!(index = idx, error = %err, "image upload failed mid-batch");
                    return Err(err);
                }
            }
        }
        Ok(receipts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryContentStore;
    use bytes::Bytes;

    fn uploader() -> MediaUploader {
        MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default())
    }

    #[tokio::test]
    async fn upload_single_image() {
        let uploader = uploader();
        let image = ImageBlob::new(Bytes::from_static(b"fake-jpeg-bytes"), "image/jpeg");
        let receipt = uploader.upload(&image).await.unwrap();
        assert_eq!(receipt.size_bytes, 15);
    }

    #[tokio::test]
    async fn upload_all_preserves_order() {
        let uploader = uploader();
        let images = vec![
            ImageBlob::new(Bytes::from_static(b"one"), "image/jpeg"),
            ImageBlob::new(Bytes::from_static(b"two"), "image/png"),
        ];
        let receipts = uploader.upload_all(&images).await.unwrap();
        assert_eq!(receipts.len(), 2);
        assert_ne!(receipts[0].id, receipts[1].id);
    }

    #[tokio::test]
    async fn oversized_image_is_permanent_error() {
        let uploader = MediaUploader::new(
            InMemoryContentStore::new(),
            MediaConfig::default().with_max_blob_bytes(4),
        );
        let image = ImageBlob::new(Bytes::from_static(b"too-big"), "image/jpeg");
        let err = uploader.upload(&image).await.unwrap_err();
        assert!(!err.is_retryable());
    }
}
