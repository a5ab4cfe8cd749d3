//! Common test utilities and helpers
//!
//! - Recording mock of the remote API
//! - Sync core fixtures over memory or SQLite storage
#![allow(dead_code)]

pub mod fixtures;
pub mod mock_remote;

pub use fixtures::*;
pub use mock_remote::*;
