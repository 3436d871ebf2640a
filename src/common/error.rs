// src/common/error.rs

/// Protocol-level failures. None of these involve the transport itself, so
/// they can be produced by pure code (command builders, outcome decoding).
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// No byte became available after the settle delay.
    #[error("No response from device (connection absent)")]
    ConnectionAbsent,

    /// A terminated frame arrived but did not echo the command that was sent.
    #[error("Echo does not match the command sent")]
    ProtocolMismatch,

    /// The read bound was reached before a terminator arrived.
    #[error("Frame truncated: no terminator within the buffer bound")]
    FrameTruncated,

    /// The echo matched but the trailing numeric field is absent or not an integer.
    #[error("Numeric payload missing or unparseable")]
    DecodeFailure,

    /// A dialect-dependent command was requested before a successful handshake.
    #[error("Firmware dialect not established")]
    DialectUnestablished,

    /// Channel numbers run from 1 to `Channel::MAX`.
    #[error("Invalid channel number: {0}")]
    InvalidChannel(u8),

    /// The formatted command does not fit the command buffer.
    #[error("Command exceeds the command buffer capacity")]
    CommandTooLong,

    /// Command text is empty, not printable ASCII, or embeds the terminator.
    #[error("Invalid command text")]
    InvalidCommand,
}

#[derive(Debug, thiserror::Error)]
pub enum FirestingError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// A write or flush did not complete in time.
    #[error("Operation timed out")]
    Timeout,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl<E: core::fmt::Debug> FirestingError<E> {
    /// Returns the protocol-level cause, if this is not a transport failure.
    pub fn protocol(&self) -> Option<ProtocolError> {
        match self {
            FirestingError::Protocol(e) => Some(*e),
            _ => None,
        }
    }
}
