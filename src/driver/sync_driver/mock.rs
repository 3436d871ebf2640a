// src/driver/sync_driver/mock.rs

//! Scripted device used by the driver tests.

use crate::common::{
    hal_traits::{FirestingSerial, FirestingTimer},
    TERMINATOR,
};
use core::time::Duration;
use nb::Result as NbResult;
use std::collections::VecDeque;

// --- Mock Instant ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub u64);
impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}
impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

// --- Mock Interface ---
/// A device that answers each terminated command with the next scripted reply.
#[derive(Debug, Clone, Default)]
pub struct MockInterface {
    pub current_time_us: u64,
    pub baud: Option<u32>,
    pub open_log: Vec<u32>,
    pub closed: bool,
    pub write_log: Vec<u8>,
    pub flushes: u32,
    /// Bytes waiting to be read.
    pub rx: VecDeque<u8>,
    /// One entry per command the device will answer; `None` stays silent.
    pub replies: VecDeque<Option<Vec<u8>>>,
    /// Only answer while the port is open at this rate (`None`: any rate).
    pub live_baud: Option<u32>,
    /// Sent instead of a reply while open at any other rate.
    pub wrong_baud_noise: Option<Vec<u8>>,
    /// Stop delivering bytes after this many reads.
    pub stall_after: Option<usize>,
    pub bytes_read: usize,
    pub read_error: bool,
    /// Microseconds the port needs before it accepts each further byte.
    pub write_cost_us: u64,
    last_write_us: u64,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, bytes: &[u8]) -> Self {
        self.replies.push_back(Some(bytes.to_vec()));
        self
    }

    pub fn silent(mut self) -> Self {
        self.replies.push_back(None);
        self
    }

    pub fn with_stale(mut self, bytes: &[u8]) -> Self {
        self.rx.extend(bytes.iter().copied());
        self
    }

    pub fn advance_time(&mut self, us: u64) {
        self.current_time_us = self.current_time_us.saturating_add(us);
    }

    pub fn written(&self) -> &[u8] {
        &self.write_log
    }

    fn stalled(&self) -> bool {
        self.stall_after.is_some_and(|limit| self.bytes_read >= limit)
    }

    fn answer(&mut self) {
        let live = match (self.live_baud, self.baud) {
            (None, _) => true,
            (Some(live), Some(open)) => live == open,
            (Some(_), None) => false,
        };
        if !live {
            if let Some(noise) = &self.wrong_baud_noise {
                self.rx.extend(noise.iter().copied());
            }
            return;
        }
        if let Some(Some(reply)) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
    }
}

impl FirestingTimer for MockInterface {
    type Instant = MockInstant;
    fn delay_us(&mut self, us: u32) {
        self.advance_time(us as u64);
    }
    fn delay_ms(&mut self, ms: u32) {
        self.advance_time((ms as u64) * 1000);
    }
    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }
}

impl FirestingSerial for MockInterface {
    type Error = MockCommError;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        self.baud = Some(baud_rate);
        self.closed = false;
        self.open_log.push(baud_rate);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.baud = None;
        self.closed = true;
        Ok(())
    }

    fn read_byte(&mut self) -> NbResult<u8, Self::Error> {
        if self.read_error {
            return Err(nb::Error::Other(MockCommError));
        }
        if self.stalled() {
            return Err(nb::Error::WouldBlock);
        }
        match self.rx.pop_front() {
            Some(byte) => {
                self.bytes_read += 1;
                Ok(byte)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn write_byte(&mut self, byte: u8) -> NbResult<(), Self::Error> {
        if self.current_time_us < self.last_write_us + self.write_cost_us {
            return Err(nb::Error::WouldBlock);
        }
        self.last_write_us = self.current_time_us;
        self.write_log.push(byte);
        if byte == TERMINATOR {
            self.answer();
        }
        Ok(())
    }

    fn flush(&mut self) -> NbResult<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if self.stalled() {
            Ok(0)
        } else {
            Ok(self.rx.len())
        }
    }
}
