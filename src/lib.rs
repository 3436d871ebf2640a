// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod common;
pub mod driver;

// Re-export key types for convenience
pub use common::{Channel, Command, Dialect, FirestingError, Outcome, ProtocolError};
pub use driver::{Session, SyncFiresting};
