//! Command implementations

pub mod database;
pub mod profile;
pub mod progress;
