// src/common/config.rs

use core::time::Duration;

use super::{command::CommandClass, timing};

/// Timing and link parameters of a driver instance.
///
/// `Default` reproduces the empirically tuned constants in [`timing`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub measurement_settle: Duration,
    pub version_query_settle: Duration,
    pub sequence_settle: Duration,
    pub readout_settle: Duration,
    pub inter_byte_pause: Duration,
    pub byte_timeout: Duration,
    pub drain_pause: Duration,
    pub open_settle: Duration,
    pub write_slack: Duration,
    pub flush_timeout: Duration,
    /// Tried in order during the handshake.
    pub baud_candidates: &'static [u32],
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            measurement_settle: timing::MEASUREMENT_SETTLE,
            version_query_settle: timing::VERSION_QUERY_SETTLE,
            sequence_settle: timing::SEQUENCE_SETTLE,
            readout_settle: timing::READOUT_SETTLE,
            inter_byte_pause: timing::INTER_BYTE_PAUSE,
            byte_timeout: timing::BYTE_TIMEOUT,
            drain_pause: timing::DRAIN_PAUSE,
            open_settle: timing::OPEN_SETTLE,
            write_slack: timing::WRITE_SLACK,
            flush_timeout: timing::FLUSH_TIMEOUT,
            baud_candidates: timing::BAUD_CANDIDATES,
        }
    }
}

impl DriverConfig {
    /// Settle delay applied after sending a command of `class`.
    pub fn settle_for(&self, class: CommandClass) -> Duration {
        match class {
            CommandClass::Measurement => self.measurement_settle,
            CommandClass::VersionQuery => self.version_query_settle,
            CommandClass::Sequence => self.sequence_settle,
            CommandClass::Readout => self.readout_settle,
        }
    }

    pub fn with_settle(mut self, class: CommandClass, settle: Duration) -> Self {
        match class {
            CommandClass::Measurement => self.measurement_settle = settle,
            CommandClass::VersionQuery => self.version_query_settle = settle,
            CommandClass::Sequence => self.sequence_settle = settle,
            CommandClass::Readout => self.readout_settle = settle,
        }
        self
    }

    pub fn with_baud_candidates(mut self, candidates: &'static [u32]) -> Self {
        self.baud_candidates = candidates;
        self
    }
}
