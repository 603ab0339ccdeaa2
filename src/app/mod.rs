//! Application core: the main-loop context and the port boundary.

pub mod node;
pub mod ports;
