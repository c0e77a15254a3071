//! Live update distribution
//!
//! Fans ticket mutations and refresh pings out to every connected display.
//!
//! ## Features
//! - One bounded channel per subscriber, non-blocking delivery
//! - Snapshot-then-subscribe without lost events
//! - Sequence ids for gap detection
//! - Independent `changes` and `refresh` event kinds

pub mod broadcaster;
pub mod events;
pub mod heartbeat;

pub use broadcaster::{Broadcaster, Snapshot, SubscriberId, Subscription, DEFAULT_SUBSCRIBER_BUFFER};
pub use events::{ChangeKind, EventKind, EventKinds, QueueEvent, QueueMessage};
pub use heartbeat::{Heartbeat, MAX_HEARTBEAT_SECS};
