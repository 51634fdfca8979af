//! Library side of the `bbdir` command line.

pub mod logging;
pub mod pipeline;
pub mod types;
