//! DriveDeck Client - Snapshot polling and live-update distribution
//!
//! The I/O layer between the dashboard's two data sources and its
//! consumers:
//! - [`SnapshotPoller`] fetches the inventory and health endpoints
//!   concurrently, carrying each side's failure independently
//! - [`LiveChannel`] maintains one push connection, decoding frames and
//!   fanning them out in arrival order
//! - [`SubscriberRegistry`] tracks the observers a channel delivers to
//! - [`ReconnectPolicy`] and [`supervise`] layer backoff-based
//!   reconnection above the bare channel
//!
//! Scheduling stays with the caller: the poller is a pure
//! request/response unit, and the supervision loop is opt-in.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use drivedeck_client::{LiveChannel, SubscriberRegistry};
//!
//! # tokio_test::block_on(async {
//! let registry = Arc::new(SubscriberRegistry::new());
//! registry.subscribe(|message| println!("{message:?}"));
//!
//! let channel = LiveChannel::connect("ws://127.0.0.1:9002/ws", registry)
//!     .await
//!     .unwrap();
//! // ... frames are fanned out to subscribers until the channel closes
//! channel.close().await;
//! # });
//! ```

pub mod live;
pub mod message;
pub mod poll;
pub mod reconnect;
pub mod registry;

pub use live::{ChannelState, CloseReason, LiveChannel, LiveError};
pub use message::LiveMessage;
pub use poll::{FetchError, PollCycle, SnapshotPoller};
pub use reconnect::{supervise, ReconnectPolicy};
pub use registry::{SubscriberId, SubscriberRegistry};
