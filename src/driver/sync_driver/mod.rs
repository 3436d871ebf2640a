// src/driver/sync_driver/mod.rs

use crate::common::{
    channel::Channel,
    command::{Command, Operation},
    config::DriverConfig,
    dialect::{parse_version, Dialect},
    error::{FirestingError, ProtocolError},
    frame::{ResponseBuffer, DEFAULT_RESPONSE_CAPACITY},
    hal_traits::{FirestingSerial, FirestingTimer},
    response::{Outcome, ScaledValue},
};

mod handshake;
mod io_helpers;
mod transaction;

#[cfg(test)]
pub(crate) mod mock;

/// Result of the connection handshake.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub dialect: Dialect,
    /// Baud rate at which the device answered.
    pub baud_rate: Option<u32>,
    /// Firmware version as `major * 100 + minor`, when it could be parsed.
    pub version: Option<u32>,
}

impl Session {
    pub fn is_established(&self) -> bool {
        self.dialect.is_known()
    }
}

/// Blocking driver for one FireSting device on one serial link.
///
/// Exactly one transaction is in flight at a time; every call blocks through
/// its settle delay and byte-by-byte read. `N` is the response buffer capacity.
#[derive(Debug)]
pub struct SyncFiresting<IF, const N: usize = DEFAULT_RESPONSE_CAPACITY>
where
    IF: FirestingSerial + FirestingTimer,
{
    interface: IF,
    config: DriverConfig,
    buffer: ResponseBuffer<N>,
    session: Session,
}

impl<IF, const N: usize> SyncFiresting<IF, N>
where
    IF: FirestingSerial + FirestingTimer,
{
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, DriverConfig::default())
    }

    pub fn with_config(interface: IF, config: DriverConfig) -> Self {
        SyncFiresting {
            interface,
            config,
            buffer: ResponseBuffer::new(),
            session: Session::default(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn dialect(&self) -> Dialect {
        self.session.dialect
    }

    /// Gives the interface back, ending the driver.
    pub fn release(self) -> IF {
        self.interface
    }

    /// Closes the port. The dialect is forgotten until the next handshake.
    pub fn close(&mut self) -> Result<(), FirestingError<IF::Error>> {
        self.session = Session::default();
        self.interface.close().map_err(FirestingError::Io)
    }

    /// Sends an arbitrary command and classifies the answer.
    pub fn send(&mut self, command: &Command) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        self.transact(command)
    }

    /// Builds the command for `operation` in the negotiated dialect.
    pub fn command_for(
        &self,
        operation: Operation,
        channel: u8,
    ) -> Result<Command, ProtocolError> {
        let channel = Channel::new(channel)?;
        Command::build(operation, self.session.dialect, channel)
    }

    /// Runs a dialect-dependent operation on `channel`.
    pub fn run(
        &mut self,
        operation: Operation,
        channel: u8,
    ) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        let command = self.command_for(operation, channel)?;
        self.transact(&command)
    }

    pub fn measure_oxygen(&mut self, channel: u8) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        self.run(Operation::OxygenMeasurement, channel)
    }

    pub fn measure_temperature(
        &mut self,
        channel: u8,
    ) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        self.run(Operation::TemperatureMeasurement, channel)
    }

    pub fn measure_sequence(
        &mut self,
        channel: u8,
    ) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        self.run(Operation::SequenceMeasurement, channel)
    }

    /// Reads the last oxygen value of `channel` (% air saturation x1000).
    pub fn read_oxygen(&mut self, channel: u8) -> Result<ScaledValue, FirestingError<IF::Error>> {
        self.read_value(Operation::OxygenReadout, channel)
    }

    /// Reads the last temperature of `channel` (°C x1000).
    pub fn read_temperature(
        &mut self,
        channel: u8,
    ) -> Result<ScaledValue, FirestingError<IF::Error>> {
        self.read_value(Operation::TemperatureReadout, channel)
    }

    pub fn read_value(
        &mut self,
        operation: Operation,
        channel: u8,
    ) -> Result<ScaledValue, FirestingError<IF::Error>> {
        let outcome = self.run(operation, channel)?;
        Ok(outcome.value()?)
    }

    /// Asks the device for its firmware version (`major * 100 + minor`).
    pub fn query_version(&mut self) -> Result<u32, FirestingError<IF::Error>> {
        let payload = self.transact(&Command::version_query())?.into_payload()?;
        version_from_payload(&payload).ok_or(FirestingError::Protocol(ProtocolError::DecodeFailure))
    }
}

/// The version is the first field after the `#VERS` echo. Trailing fields,
/// such as a build number, are ignored.
fn version_from_payload<const N: usize>(payload: &ResponseBuffer<N>) -> Option<u32> {
    payload
        .as_str()?
        .split_ascii_whitespace()
        .next()
        .and_then(parse_version)
}
