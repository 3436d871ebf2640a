//! FireSting command definitions.
//!
//! Commands are plain ASCII, fields separated by a single space and terminated
//! by `\r`. The vocabulary is closed and differs per firmware dialect, so every
//! template is listed explicitly in [`Operation::write_template`].

use core::fmt::{self, Write};

use arrayvec::ArrayString;

use super::{channel::Channel, dialect::Dialect, error::ProtocolError};

/// Byte that ends every command and every response frame.
pub const TERMINATOR: u8 = b'\r';

/// Capacity of the command buffer, terminator included.
pub const COMMAND_CAPACITY: usize = 24;

/// Sensor-selector bitmask of the structured `MEA` command:
/// oxygen, temperature, pressure, humidity and the raw-data block.
pub const SEQUENCE_SELECTOR: u8 = 47;

/// Groups commands by how long the device needs before it answers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CommandClass {
    /// Single oxygen or temperature measurement.
    Measurement,
    /// Firmware version probe/query.
    VersionQuery,
    /// Sequenced multi-value measurement.
    Sequence,
    /// Read back a value already stored in device memory.
    Readout,
}

/// Logical, channel-parameterised operations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operation {
    OxygenMeasurement,
    TemperatureMeasurement,
    SequenceMeasurement,
    OxygenReadout,
    TemperatureReadout,
}

impl Operation {
    pub const fn class(&self) -> CommandClass {
        match self {
            Operation::OxygenMeasurement | Operation::TemperatureMeasurement => {
                CommandClass::Measurement
            }
            Operation::SequenceMeasurement => CommandClass::Sequence,
            Operation::OxygenReadout | Operation::TemperatureReadout => CommandClass::Readout,
        }
    }

    /// Writes the command text (without terminator) for this operation.
    fn write_template<W: Write>(
        &self,
        out: &mut W,
        dialect: Dialect,
        channel: Channel,
    ) -> Result<(), ProtocolError> {
        let c = channel.number();
        let written = match (self, dialect) {
            (_, Dialect::Unknown) => return Err(ProtocolError::DialectUnestablished),

            (Operation::OxygenMeasurement, Dialect::V3) => write!(out, "MSR {}", c),
            (Operation::TemperatureMeasurement, Dialect::V3) => write!(out, "TMP {}", c),
            (Operation::SequenceMeasurement, Dialect::V3) => write!(out, "SEQ {}", c),
            (Operation::OxygenReadout, Dialect::V3) => write!(out, "REA {} 3 4", c),
            (Operation::TemperatureReadout, Dialect::V3) => write!(out, "REA {} 3 5", c),

            (Operation::OxygenMeasurement, Dialect::V4) => write!(out, "MEA {} 1", c),
            (Operation::TemperatureMeasurement, Dialect::V4) => write!(out, "MEA {} 2", c),
            (Operation::SequenceMeasurement, Dialect::V4) => {
                write!(out, "MEA {} {}", c, SEQUENCE_SELECTOR)
            }
            (Operation::OxygenReadout, Dialect::V4) => write!(out, "REA {} 3 4", c),
            (Operation::TemperatureReadout, Dialect::V4) => write!(out, "REA {} 3 5", c),
        };
        written.map_err(|_| ProtocolError::CommandTooLong)
    }
}

/// An immutable, terminator-suffixed command ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: ArrayString<COMMAND_CAPACITY>,
    class: CommandClass,
}

impl Command {
    /// Builds the command for `operation` on `channel` in the given dialect.
    pub fn build(
        operation: Operation,
        dialect: Dialect,
        channel: Channel,
    ) -> Result<Self, ProtocolError> {
        let mut text = ArrayString::new();
        operation.write_template(&mut text, dialect, channel)?;
        text.try_push(TERMINATOR as char)
            .map_err(|_| ProtocolError::CommandTooLong)?;
        Ok(Command {
            text,
            class: operation.class(),
        })
    }

    /// The firmware version query. Valid in every dialect, so it doubles as
    /// the liveness probe of the handshake.
    pub fn version_query() -> Self {
        let mut text = ArrayString::new();
        // "#VERS\r" always fits the command buffer.
        let _ = text.try_push_str("#VERS\r");
        Command {
            text,
            class: CommandClass::VersionQuery,
        }
    }

    /// Wraps caller-supplied command text, appending the terminator if absent.
    ///
    /// The text must be printable ASCII and must not contain the terminator
    /// anywhere but at the end.
    pub fn raw(text: &str, class: CommandClass) -> Result<Self, ProtocolError> {
        let body = text.strip_suffix(TERMINATOR as char).unwrap_or(text);
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(ProtocolError::InvalidCommand);
        }
        let mut buf = ArrayString::new();
        buf.try_push_str(body)
            .map_err(|_| ProtocolError::CommandTooLong)?;
        buf.try_push(TERMINATOR as char)
            .map_err(|_| ProtocolError::CommandTooLong)?;
        Ok(Command {
            text: buf,
            class,
        })
    }

    /// Full wire bytes, terminator included.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Command text without the terminator; this is what the device echoes.
    pub fn echo(&self) -> &str {
        let s = self.text.as_str();
        s.strip_suffix(TERMINATOR as char).unwrap_or(s)
    }

    pub fn class(&self) -> CommandClass {
        self.class
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.echo())
    }
}
