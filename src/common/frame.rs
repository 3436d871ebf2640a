// src/common/frame.rs

use arrayvec::ArrayVec;
use core::fmt;

/// Default capacity of the response buffer.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 64;

/// How a read cycle ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Nothing was available after the settle delay.
    Silent,
    /// A terminator ended the frame.
    Terminated,
    /// The read bound was hit, or the stream stalled, before a terminator.
    Unterminated,
}

/// Bounded response buffer.
///
/// Length never exceeds `N`. Once full, further bytes overwrite the last slot
/// instead of growing the buffer.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ResponseBuffer<const N: usize = DEFAULT_RESPONSE_CAPACITY> {
    bytes: ArrayVec<u8, N>,
}

impl<const N: usize> ResponseBuffer<N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        ResponseBuffer {
            bytes: ArrayVec::new(),
        }
    }

    /// Appends a byte, saturating at capacity.
    pub fn push(&mut self, byte: u8) {
        if let Err(overflow) = self.bytes.try_push(byte) {
            if let Some(last) = self.bytes.last_mut() {
                *last = overflow.element();
            }
        }
    }

    /// Logical reset: length back to zero.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bytes.is_full()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The contents as text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }
}

impl<const N: usize> fmt::Debug for ResponseBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "ResponseBuffer({:?})", s),
            None => write!(f, "ResponseBuffer({:02x?})", self.as_bytes()),
        }
    }
}
