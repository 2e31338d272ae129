//! Command execution and output-stream demultiplexing.
//!
//! This is the core subsystem: [`ExecRunner`] opens an exec channel against
//! the running container, [`StreamDemux`] splits the daemon's multiplexed
//! byte stream back into stdout and stderr, and the final exit status is
//! read from the channel once the stream ends.

mod demux;
mod runner;

pub use demux::StreamDemux;
pub use runner::{CommandResult, ExecRunner};
