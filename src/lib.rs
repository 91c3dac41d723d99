// Public API for the simulator binary and integration tests

pub mod config;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod state;
pub mod store;
pub mod types;
