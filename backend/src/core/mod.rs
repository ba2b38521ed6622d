//! Time primitives shared by the configuration engine

pub mod duration;
pub mod time;
