pub mod events;
pub mod ids;
pub mod record;

pub use events::QueueEvent;
pub use ids::JobId;
pub use record::{JobRecord, JobStatus};
