//! feedly-rules — route saved Feedly entries through user-defined rules.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processors;
pub mod todos;
