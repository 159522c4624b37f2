//! Channels — I/O adapters for the services entries come from.

pub mod feedly;

pub use feedly::{FeedSource, FeedlyClient, saved_entries};
