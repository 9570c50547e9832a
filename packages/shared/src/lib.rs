//! Utilities shared by the Roka crates.

pub mod logger;
pub mod time;
