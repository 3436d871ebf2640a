// src/driver/sync_driver/io_helpers.rs

use super::SyncFiresting;
use crate::common::{
    error::FirestingError,
    frame::FrameStatus,
    hal_traits::{FirestingSerial, FirestingTimer},
    timing, TERMINATOR,
};
use core::time::Duration;
use log::{trace, warn};
use nb::Result as NbResult;

// Implementation block for I/O related helpers
impl<IF, const N: usize> SyncFiresting<IF, N>
where
    IF: FirestingSerial + FirestingTimer,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, FirestingError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let deadline = self.interface.now() + timeout;

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Err(FirestingError::Timeout);
                    }
                    self.interface.delay_us(timing::POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(e)) => return Err(FirestingError::Io(e)),
            }
        }
    }

    /// Discards bytes left over from an earlier, desynchronised exchange.
    /// Returns how many were dropped.
    pub(super) fn discard_pending(&mut self) -> Result<usize, FirestingError<IF::Error>> {
        let mut discarded = 0;
        while discarded < timing::DRAIN_LIMIT
            && self.interface.bytes_available().map_err(FirestingError::Io)? > 0
        {
            match self.interface.read_byte() {
                Ok(_) => discarded += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(FirestingError::Io(e)),
            }
            self.interface.delay(self.config.drain_pause);
        }
        if discarded > 0 {
            trace!("discarded {} stale bytes", discarded);
        }
        Ok(discarded)
    }

    /// Sends the already formatted command bytes and waits for the transmit
    /// buffer to drain.
    ///
    /// The whole command shares one deadline: its nominal transmit time at the
    /// current baud rate plus `write_slack`.
    pub(super) fn send_command_bytes(
        &mut self,
        cmd_bytes: &[u8],
    ) -> Result<(), FirestingError<IF::Error>> {
        let baud = self
            .session
            .baud_rate
            .or_else(|| self.config.baud_candidates.first().copied())
            .unwrap_or(0);
        let write_timeout =
            timing::byte_duration(baud) * cmd_bytes.len() as u32 + self.config.write_slack;
        let deadline = self.interface.now() + write_timeout;

        for byte in cmd_bytes {
            let now = self.interface.now();
            let remaining = if now < deadline { deadline - now } else { Duration::ZERO };
            self.execute_blocking_io_with_timeout(remaining, |iface| iface.write_byte(*byte))?;
        }

        let flush_timeout = self.config.flush_timeout;
        self.execute_blocking_io_with_timeout(flush_timeout, |iface| iface.flush())?;
        Ok(())
    }

    /// Waits up to `timeout` for at least one byte to become available.
    pub(super) fn wait_for_data(
        &mut self,
        timeout: Duration,
    ) -> Result<bool, FirestingError<IF::Error>> {
        let polled = self.execute_blocking_io_with_timeout(timeout, |iface| {
            match iface.bytes_available() {
                Ok(0) => Err(nb::Error::WouldBlock),
                Ok(_) => Ok(()),
                Err(e) => Err(nb::Error::Other(e)),
            }
        });
        match polled {
            Ok(()) => Ok(true),
            Err(FirestingError::Timeout) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Reads one frame into the response buffer.
    ///
    /// Must be called once the settle delay has elapsed. At most `N` bytes are
    /// consumed; the terminator is not stored.
    pub(super) fn read_frame(&mut self) -> Result<FrameStatus, FirestingError<IF::Error>> {
        self.buffer.clear();

        if self.interface.bytes_available().map_err(FirestingError::Io)? == 0 {
            return Ok(FrameStatus::Silent);
        }

        for _ in 0..N {
            self.interface.delay(self.config.inter_byte_pause);
            let byte_timeout = self.config.byte_timeout;
            match self.execute_blocking_io_with_timeout(byte_timeout, |iface| iface.read_byte()) {
                Ok(TERMINATOR) => return Ok(FrameStatus::Terminated),
                Ok(byte) => self.buffer.push(byte),
                Err(FirestingError::Timeout) => {
                    warn!("stream stalled after {} bytes", self.buffer.len());
                    return Ok(FrameStatus::Unterminated);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("no terminator within {} bytes", N);
        Ok(FrameStatus::Unterminated)
    }
}

// --- Unit Tests for IO Helpers ---
#[cfg(test)]
mod tests {
    use super::super::mock::{MockCommError, MockInterface};
    use super::*;

    #[test]
    fn test_execute_blocking_io_with_timeout() {
        let mut driver: SyncFiresting<_> = SyncFiresting::new(MockInterface::new());

        // Ok after a few polls
        let mut polls = 0;
        let result_ok: Result<i32, _> =
            driver.execute_blocking_io_with_timeout(Duration::from_millis(10), |iface| {
                polls += 1;
                iface.advance_time(1_000);
                if polls < 4 {
                    Err(nb::Error::WouldBlock)
                } else {
                    Ok(123)
                }
            });
        assert!(matches!(result_ok, Ok(123)));
        assert_eq!(polls, 4);

        // Timeout path
        driver.interface.current_time_us = 0;
        let mut polls = 0;
        let result_timeout: Result<(), _> =
            driver.execute_blocking_io_with_timeout(Duration::from_millis(5), |iface| {
                polls += 1;
                iface.advance_time(2_000);
                Err(nb::Error::WouldBlock)
            });
        assert!(matches!(result_timeout, Err(FirestingError::Timeout)));
        assert_eq!(polls, 3);

        // IO error path
        let result_io_err: Result<(), _> = driver
            .execute_blocking_io_with_timeout(Duration::from_millis(10), |_| {
                Err(nb::Error::Other(MockCommError))
            });
        assert!(matches!(result_io_err, Err(FirestingError::Io(MockCommError))));
    }

    #[test]
    fn test_discard_pending() {
        let mock = MockInterface::new().with_stale(b"stale\r junk");
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert_eq!(driver.discard_pending().unwrap(), 11);
        assert!(driver.interface.rx.is_empty());
        assert_eq!(driver.discard_pending().unwrap(), 0);
    }

    #[test]
    fn test_discard_pending_is_bounded() {
        let flood = vec![b'x'; timing::DRAIN_LIMIT + 10];
        let mock = MockInterface::new().with_stale(&flood);
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert_eq!(driver.discard_pending().unwrap(), timing::DRAIN_LIMIT);
        assert_eq!(driver.interface.rx.len(), 10);
    }

    #[test]
    fn test_send_command_bytes_success() {
        let mut driver: SyncFiresting<_> = SyncFiresting::new(MockInterface::new());
        driver.send_command_bytes(b"MSR 1\r").unwrap();
        assert_eq!(driver.interface.written(), b"MSR 1\r");
        assert_eq!(driver.interface.flushes, 1);
    }

    #[test]
    fn test_send_command_bytes_shares_one_deadline() {
        // 6 bytes at 19200 baud: 6 * 520 us + 20 ms slack
        let mut mock = MockInterface::new();
        mock.write_cost_us = 2_000;
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        driver.send_command_bytes(b"MSR 1\r").unwrap();
        assert_eq!(driver.interface.written(), b"MSR 1\r");

        // every byte fits the budget on its own, the command as a whole does not
        let mut mock = MockInterface::new();
        mock.write_cost_us = 5_000;
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert!(matches!(
            driver.send_command_bytes(b"MSR 1\r"),
            Err(FirestingError::Timeout)
        ));
        assert!(driver.interface.written().len() < 6);
        assert_eq!(driver.interface.flushes, 0);
    }

    #[test]
    fn test_read_frame_terminated() {
        let mock = MockInterface::new().with_stale(b"REA 1 3 4 21450\rnext");
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert_eq!(driver.read_frame().unwrap(), FrameStatus::Terminated);
        assert_eq!(driver.buffer.as_bytes(), b"REA 1 3 4 21450");
        // Bytes after the terminator stay queued.
        assert_eq!(driver.interface.rx.len(), 4);
    }

    #[test]
    fn test_read_frame_silent() {
        let mut driver: SyncFiresting<_> = SyncFiresting::new(MockInterface::new());
        assert_eq!(driver.read_frame().unwrap(), FrameStatus::Silent);
        assert!(driver.buffer.is_empty());
    }

    #[test]
    fn test_read_frame_stops_at_bound() {
        let mock = MockInterface::new().with_stale(&[b'7'; 20]);
        let mut driver: SyncFiresting<_, 8> = SyncFiresting::new(mock);
        assert_eq!(driver.read_frame().unwrap(), FrameStatus::Unterminated);
        assert_eq!(driver.buffer.len(), 8);
        assert_eq!(driver.interface.bytes_read, 8);
        assert_eq!(driver.interface.rx.len(), 12);
    }

    #[test]
    fn test_read_frame_stalled_stream() {
        let mut mock = MockInterface::new().with_stale(b"MSR 1 21");
        mock.stall_after = Some(5);
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert_eq!(driver.read_frame().unwrap(), FrameStatus::Unterminated);
        assert_eq!(driver.buffer.as_bytes(), b"MSR 1");
    }

    #[test]
    fn test_read_frame_io_error() {
        let mut mock = MockInterface::new().with_stale(b"MSR");
        mock.read_error = true;
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        assert!(matches!(driver.read_frame(), Err(FirestingError::Io(MockCommError))));
    }

    #[test]
    fn test_wait_for_data() {
        let mut driver: SyncFiresting<_> = SyncFiresting::new(MockInterface::new());
        assert!(!driver.wait_for_data(Duration::from_millis(5)).unwrap());
        assert!(driver.interface.current_time_us >= 5_000);

        driver.interface.rx.push_back(b'1');
        assert!(driver.wait_for_data(Duration::from_millis(5)).unwrap());
    }

    #[test]
    fn test_reader_paces_bytes() {
        let mock = MockInterface::new().with_stale(b"ab\r");
        let mut driver: SyncFiresting<_> = SyncFiresting::new(mock);
        driver.read_frame().unwrap();
        let paced = timing::INTER_BYTE_PAUSE.as_micros() as u64 * 3;
        assert!(driver.interface.current_time_us >= paced);
    }
}
