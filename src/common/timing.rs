// src/common/timing.rs

use core::time::Duration;

// Settle delays are empirical: the device answers only once the requested
// operation has finished on the optode. Readouts come straight from memory and
// settle fastest.

// === Settle Delays per Command Class ===

/// Wait after a single oxygen/temperature measurement command.
pub const MEASUREMENT_SETTLE: Duration = Duration::from_millis(500);
/// Wait after a version probe or query.
pub const VERSION_QUERY_SETTLE: Duration = Duration::from_millis(200);
/// Wait after a sequenced multi-value measurement command.
pub const SEQUENCE_SETTLE: Duration = Duration::from_millis(500);
/// Wait after a memory readout command.
pub const READOUT_SETTLE: Duration = Duration::from_millis(100);

// === Byte Timing ===

/// Pause before each byte read, so the reader never outruns the line.
pub const INTER_BYTE_PAUSE: Duration = Duration::from_millis(2);
/// Gap after which a frame that has started is considered stalled.
pub const BYTE_TIMEOUT: Duration = Duration::from_millis(20);
/// Pause between discarded stale bytes.
pub const DRAIN_PAUSE: Duration = Duration::from_millis(2);
/// Upper bound on stale bytes discarded before one transaction.
pub const DRAIN_LIMIT: usize = 512;

// === Link Setup ===

/// Wait after (re)opening the port before the first probe.
pub const OPEN_SETTLE: Duration = Duration::from_millis(200);
/// Slack added on top of the nominal transmit time of a command.
pub const WRITE_SLACK: Duration = Duration::from_millis(20);
/// Time allowed for the transmit buffer to drain.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(10);
/// Poll interval while a non-blocking primitive reports `WouldBlock`.
pub const POLL_INTERVAL_US: u32 = 100;

/// Baud rates tried during the handshake, in order.
/// 3.xx firmware talks at 19200 baud, 4.xx at 115200.
pub const BAUD_CANDIDATES: &[u32] = &[19_200, 115_200];

/// Nominal on-wire duration of one byte (8N1, 10 bits) at `baud`.
pub fn byte_duration(baud: u32) -> Duration {
    if baud == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(10_000_000 / baud as u64)
}
