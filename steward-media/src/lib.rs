//! Content-addressed media upload for the garden-stewardship submission core.
//!
//! An image dropped into a draft needs to end up as a stable id that can be
//! embedded in a submission payload before the chain ever sees it. This
//! crate is the narrow slice of that pipeline: given bytes, store them and
//! hand back an id; later, given the id, confirm it's still there.
//!
//! ```no_run
//! use steward_media::{MediaConfig, MediaUploader, ImageBlob, store::InMemoryContentStore};
//!
//! # async fn run() -> steward_media::MediaResult<()> {
//! let uploader = MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default());
//! let image = ImageBlob::new(bytes::Bytes::from_static(b"..."), "image/jpeg");
//! let receipt = uploader.upload(&image).await?;
//! println!("uploaded {}", receipt.id);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod config;
mod error;
mod receipt;
pub mod store;
mod types;

pub use adapter::MediaUploader;
pub use config::MediaConfig;
pub use error::{MediaError, MediaResult};
pub use receipt::MediaReceipt;
pub use store::{ContentStore, InMemoryContentStore, PutResult};
pub use types::{ImageBlob, MediaCtx, MediaId};
