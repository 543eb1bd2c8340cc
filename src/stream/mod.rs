//! Timed key streams and the registry that owns them.

mod registry;
mod timed;

pub use registry::StreamRegistry;
pub use timed::{KeyData, KeyTransition, SubscriptionId, TimedKeyStream, FIRST_TICK_DELTA};
