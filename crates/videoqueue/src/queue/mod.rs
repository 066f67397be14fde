pub mod error;
pub mod link;
pub mod memory;
pub mod model;
pub mod repo;
pub mod store;
pub mod submission;

pub use error::QueueError;
pub use link::VideoLink;
pub use memory::MemoryQueueStore;
pub use model::{NewBatch, NewQueueItem, QueueItem, QueueStatus, StatusCounts};
pub use repo::{PgQueueStore, QueueItemRow};
pub use store::{QueueStore, SharedQueueStore};
pub use submission::Submission;
