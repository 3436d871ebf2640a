// src/common/channel.rs

use super::error::ProtocolError;
use core::fmt;

/// An optical channel of the device, numbered from 1.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Channel(u8);

impl Channel {
    /// Highest channel number on a four-channel device.
    pub const MAX: u8 = 4;

    pub const FIRST: Channel = Channel(1);

    /// Creates a new `Channel` if `number` is within `1..=Channel::MAX`.
    pub fn new(number: u8) -> Result<Self, ProtocolError> {
        if Self::is_valid(number) {
            Ok(Channel(number))
        } else {
            Err(ProtocolError::InvalidChannel(number))
        }
    }

    #[inline]
    pub const fn number(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid(number: u8) -> bool {
        matches!(number, 1..=Self::MAX)
    }

    /// All channels of a device, in order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (1..=Self::MAX).map(Channel)
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u8> for Channel {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
