// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod calendar;
pub mod channel;
pub mod command;
pub mod config;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod response;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

pub use calendar::{days_inclusive, is_leap_year, CalendarDate, CalendarError};
pub use channel::Channel;
pub use command::{Command, CommandClass, Operation, COMMAND_CAPACITY, TERMINATOR};
pub use config::DriverConfig;
pub use dialect::{parse_version, Dialect};
pub use error::{FirestingError, ProtocolError};
pub use frame::{FrameStatus, ResponseBuffer, DEFAULT_RESPONSE_CAPACITY};
pub use hal_traits::{FirestingInstant, FirestingSerial, FirestingTimer, Link};
pub use response::{classify, parse_scaled_value, Outcome, ScaledValue};

#[cfg(feature = "std")]
pub use hal_traits::StdTimer;

#[cfg(feature = "impl-generic-hal")]
pub use hal_traits::{DelayTimer, ElapsedMicros};
