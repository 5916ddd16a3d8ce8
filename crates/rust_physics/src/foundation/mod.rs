//! Foundation utilities shared by every physics module

pub mod logging;
pub mod math;
pub mod time;
