//! Remote trigger for the drain worker.
//!
//! The worker runs on a repository-automation platform (GitHub Actions) and
//! listens for a `repository_dispatch` event. Triggering it means one
//! authenticated POST to the repository's `dispatches` endpoint; the gateway
//! waits for that acknowledgement and nothing else.

pub mod error;
pub mod gateway;
pub mod settings;

pub use error::TriggerError;
pub use gateway::{DispatchAck, TriggerGateway};
pub use settings::{TriggerSettings, DEFAULT_API_BASE, DISPATCH_EVENT};
