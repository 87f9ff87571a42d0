//! Command handling for the relay server
//!
//! This module handles:
//! - Serializing access to the command queue
//! - Periodically sweeping expired commands
//! - Validating and sanitizing incoming fields

mod broker;
mod sweeper;
pub mod validate;

pub use broker::CommandBroker;
pub use sweeper::ExpirySweeper;
