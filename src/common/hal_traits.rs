// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point in time as seen by a [`FirestingTimer`].
pub trait FirestingInstant:
    Copy + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> FirestingInstant for T where
    T: Copy + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Abstraction for the delays and clock the driver needs.
pub trait FirestingTimer {
    type Instant: FirestingInstant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Current time of a monotonic clock.
    fn now(&self) -> Self::Instant;

    /// Delay for at least `duration`, split into chunks that fit a `u32`.
    fn delay(&mut self, duration: Duration) {
        let mut remaining_ms = duration.as_millis();
        while remaining_ms > 0 {
            let chunk = remaining_ms.min(u32::MAX as u128) as u32;
            self.delay_ms(chunk);
            remaining_ms -= chunk as u128;
        }
        let rest_us = duration.subsec_micros() % 1_000;
        if rest_us > 0 {
            self.delay_us(rest_us);
        }
    }
}

/// Byte-oriented duplex serial channel to the device.
///
/// One implementation covers both a hardware UART and a software-emulated
/// one; the driver never needs to know which.
pub trait FirestingSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// (Re)initialises the port at the given baud rate.
    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error>;

    /// Releases the port.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to queue a single byte for transmission.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Number of received bytes waiting to be read.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;
}

/// Pairs a serial port with a separate timer into one driver interface.
#[derive(Debug)]
pub struct Link<S, T> {
    pub serial: S,
    pub timer: T,
}

impl<S, T> Link<S, T> {
    pub fn new(serial: S, timer: T) -> Self {
        Link { serial, timer }
    }

    pub fn release(self) -> (S, T) {
        (self.serial, self.timer)
    }
}

impl<S: FirestingSerial, T> FirestingSerial for Link<S, T> {
    type Error = S::Error;

    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        self.serial.open(baud_rate)
    }
    fn close(&mut self) -> Result<(), Self::Error> {
        self.serial.close()
    }
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.serial.read_byte()
    }
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        self.serial.write_byte(byte)
    }
    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.serial.flush()
    }
    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.serial.bytes_available()
    }
}

impl<S, T: FirestingTimer> FirestingTimer for Link<S, T> {
    type Instant = T::Instant;

    fn delay_us(&mut self, us: u32) {
        self.timer.delay_us(us)
    }
    fn delay_ms(&mut self, ms: u32) {
        self.timer.delay_ms(ms)
    }
    fn now(&self) -> Self::Instant {
        self.timer.now()
    }
}

/// Timer backed by the standard library clock and `thread::sleep`.
#[cfg(feature = "std")]
#[derive(Debug, Default, Copy, Clone)]
pub struct StdTimer;

#[cfg(feature = "std")]
impl FirestingTimer for StdTimer {
    type Instant = std::time::Instant;

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }
}

/// Instant of a [`DelayTimer`]: microseconds of delay performed so far.
#[cfg(feature = "impl-generic-hal")]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ElapsedMicros(pub u64);

#[cfg(feature = "impl-generic-hal")]
impl Add<Duration> for ElapsedMicros {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        ElapsedMicros(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

#[cfg(feature = "impl-generic-hal")]
impl Sub<ElapsedMicros> for ElapsedMicros {
    type Output = Duration;
    fn sub(self, rhs: ElapsedMicros) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

/// Adapts any `embedded_hal::delay::DelayNs` into a [`FirestingTimer`].
///
/// Boards without a free-running clock only offer blocking delays. The driver
/// waits exclusively through this timer, so the sum of the delays performed
/// is a usable monotonic clock.
#[cfg(feature = "impl-generic-hal")]
#[derive(Debug)]
pub struct DelayTimer<D> {
    delay: D,
    elapsed: ElapsedMicros,
}

#[cfg(feature = "impl-generic-hal")]
impl<D: embedded_hal::delay::DelayNs> DelayTimer<D> {
    pub fn new(delay: D) -> Self {
        DelayTimer {
            delay,
            elapsed: ElapsedMicros::default(),
        }
    }

    pub fn release(self) -> D {
        self.delay
    }
}

#[cfg(feature = "impl-generic-hal")]
impl<D: embedded_hal::delay::DelayNs> FirestingTimer for DelayTimer<D> {
    type Instant = ElapsedMicros;

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
        self.elapsed = self.elapsed + Duration::from_micros(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
        self.elapsed = self.elapsed + Duration::from_millis(ms as u64);
    }

    fn now(&self) -> Self::Instant {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTimer {
        elapsed_us: u64,
        calls: u32,
    }

    impl FirestingTimer for RecordingTimer {
        type Instant = Duration;
        fn delay_us(&mut self, us: u32) {
            self.calls += 1;
            self.elapsed_us += us as u64;
        }
        fn delay_ms(&mut self, ms: u32) {
            self.calls += 1;
            self.elapsed_us += ms as u64 * 1_000;
        }
        fn now(&self) -> Duration {
            Duration::from_micros(self.elapsed_us)
        }
    }

    #[test]
    fn delay_splits_milliseconds_and_micros() {
        let mut timer = RecordingTimer::default();
        timer.delay(Duration::from_micros(2_250));
        assert_eq!(timer.elapsed_us, 2_250);
        assert_eq!(timer.calls, 2);

        let mut timer = RecordingTimer::default();
        timer.delay(Duration::ZERO);
        assert_eq!(timer.calls, 0);
    }

    #[cfg(feature = "impl-generic-hal")]
    #[test]
    fn delay_timer_tracks_elapsed_time() {
        struct NoopDelay;
        impl embedded_hal::delay::DelayNs for NoopDelay {
            fn delay_ns(&mut self, _ns: u32) {}
        }

        let mut timer = DelayTimer::new(NoopDelay);
        let start = timer.now();
        timer.delay_ms(3);
        timer.delay_us(40);
        assert_eq!(timer.now() - start, Duration::from_micros(3_040));
    }
}
