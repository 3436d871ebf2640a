// src/common/response.rs

//! Classification of a read cycle and decoding of numeric payloads.
//!
//! The device echoes every command verbatim before appending any payload
//! fields. Comparing that echo with the command sent is the only integrity
//! check the protocol offers; there is no checksum.

use core::fmt;

use super::{
    command::Command,
    error::ProtocolError,
    frame::{FrameStatus, ResponseBuffer, DEFAULT_RESPONSE_CAPACITY},
};

/// Scale factor of every numeric payload (% air saturation x1000, °C x1000).
pub const VALUE_SCALE: i32 = 1000;

/// Result of one command/response transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<const N: usize = DEFAULT_RESPONSE_CAPACITY> {
    /// No byte arrived after the settle delay.
    NoResponse,
    /// The echo matched. Holds whatever followed the echo.
    EchoMatch(ResponseBuffer<N>),
    /// The echo did not match, or the frame never terminated (`truncated`).
    EchoMismatch {
        raw: ResponseBuffer<N>,
        truncated: bool,
    },
}

impl<const N: usize> Outcome<N> {
    /// Numeric result code used at the boundary:
    /// `0` no response, `1` echo match, `9` mismatch.
    pub fn code(&self) -> u8 {
        match self {
            Outcome::NoResponse => 0,
            Outcome::EchoMatch(_) => 1,
            Outcome::EchoMismatch { .. } => 9,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::EchoMatch(_))
    }

    /// The payload of a matched echo.
    pub fn payload(&self) -> Option<&ResponseBuffer<N>> {
        match self {
            Outcome::EchoMatch(payload) => Some(payload),
            _ => None,
        }
    }

    /// The error a non-matching outcome stands for.
    pub fn error(&self) -> Option<ProtocolError> {
        match self {
            Outcome::EchoMatch(_) => None,
            Outcome::NoResponse => Some(ProtocolError::ConnectionAbsent),
            Outcome::EchoMismatch { truncated: true, .. } => Some(ProtocolError::FrameTruncated),
            Outcome::EchoMismatch { truncated: false, .. } => Some(ProtocolError::ProtocolMismatch),
        }
    }

    /// Converts a failed outcome into its error.
    pub fn into_payload(self) -> Result<ResponseBuffer<N>, ProtocolError> {
        match self {
            Outcome::EchoMatch(payload) => Ok(payload),
            other => Err(other.error().unwrap_or(ProtocolError::ProtocolMismatch)),
        }
    }

    /// Decodes the last whitespace-delimited field of a matched payload.
    pub fn value(&self) -> Result<ScaledValue, ProtocolError> {
        match self {
            Outcome::EchoMatch(payload) => parse_scaled_value(payload.as_bytes()),
            other => Err(other.error().unwrap_or(ProtocolError::ProtocolMismatch)),
        }
    }
}

/// Classifies a finished read cycle against the command that was sent.
///
/// A terminated frame matches when it starts with the command's echo and the
/// echo is followed by nothing or by a field separator, so `MSR 12` does not
/// pass as the echo of `MSR 1`.
pub fn classify<const N: usize>(
    command: &Command,
    status: FrameStatus,
    frame: &ResponseBuffer<N>,
) -> Outcome<N> {
    match status {
        FrameStatus::Silent => Outcome::NoResponse,
        FrameStatus::Unterminated => Outcome::EchoMismatch {
            raw: frame.clone(),
            truncated: true,
        },
        FrameStatus::Terminated => {
            let echo = command.echo().as_bytes();
            let received = frame.as_bytes();
            let echoed = received.starts_with(echo)
                && received.get(echo.len()).map_or(true, |b| *b == b' ');
            if echoed {
                let mut payload = ResponseBuffer::new();
                for b in &received[echo.len()..] {
                    payload.push(*b);
                }
                Outcome::EchoMatch(payload)
            } else {
                Outcome::EchoMismatch {
                    raw: frame.clone(),
                    truncated: false,
                }
            }
        }
    }
}

/// Parses the last whitespace-delimited field of `payload` as a signed integer.
pub fn parse_scaled_value(payload: &[u8]) -> Result<ScaledValue, ProtocolError> {
    let text = core::str::from_utf8(payload).map_err(|_| ProtocolError::DecodeFailure)?;
    let token = text
        .split_ascii_whitespace()
        .next_back()
        .ok_or(ProtocolError::DecodeFailure)?;
    token
        .parse::<i32>()
        .map(ScaledValue)
        .map_err(|_| ProtocolError::DecodeFailure)
}

/// A physical quantity transmitted as an integer scaled by 1000.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScaledValue(i32);

impl ScaledValue {
    pub const fn from_raw(raw: i32) -> Self {
        ScaledValue(raw)
    }

    /// The value as transmitted (x1000).
    pub const fn raw(&self) -> i32 {
        self.0
    }

    pub fn to_f32(&self) -> f32 {
        self.0 as f32 / VALUE_SCALE as f32
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0 as i64;
        let sign = if raw < 0 { "-" } else { "" };
        let abs = raw.abs();
        let scale = VALUE_SCALE as i64;
        write!(f, "{}{}.{:03}", sign, abs / scale, abs % scale)
    }
}
