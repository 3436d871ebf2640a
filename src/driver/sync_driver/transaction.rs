// src/driver/sync_driver/transaction.rs

use super::SyncFiresting;
use crate::common::{
    command::Command,
    error::FirestingError,
    frame::{FrameStatus, ResponseBuffer},
    hal_traits::{FirestingSerial, FirestingTimer},
    response::{classify, Outcome},
};
use core::time::Duration;
use log::{debug, warn};

impl<IF, const N: usize> SyncFiresting<IF, N>
where
    IF: FirestingSerial + FirestingTimer,
{
    /// Executes one command/response transaction using the settle delay
    /// configured for the command's class.
    pub fn transact(&mut self, command: &Command) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        let settle = self.config.settle_for(command.class());
        self.transact_with_settle(command, settle)
    }

    /// Executes one transaction with an explicit settle delay.
    ///
    /// `Err` is reserved for transport failures; every protocol-level result,
    /// silence and mismatches included, comes back as an [`Outcome`]. No retry
    /// is attempted.
    ///
    /// A bare echo is followed by one bounded wait for a separate value frame,
    /// so values sent as `MSR 1\r` then ` 21450\r` are not left on the line.
    pub fn transact_with_settle(
        &mut self,
        command: &Command,
        settle: Duration,
    ) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        self.discard_pending()?;

        debug!("sending {:?}", command.echo());
        self.send_command_bytes(command.as_bytes())?;
        self.interface.delay(settle);

        let status = self.read_frame()?;
        let mut outcome = classify(command, status, &self.buffer);

        let echo_only = outcome.payload().is_some_and(|p| !has_field(p));
        if echo_only {
            outcome = self.read_continuation(outcome)?;
        }

        match &outcome {
            Outcome::NoResponse => warn!("no response to {:?}", command.echo()),
            Outcome::EchoMatch(payload) => debug!("echo matched, payload {:?}", payload),
            Outcome::EchoMismatch { raw, truncated } => warn!(
                "echo mismatch for {:?}: {:?} (truncated: {})",
                command.echo(),
                raw,
                truncated
            ),
        }
        Ok(outcome)
    }

    /// Reads the value frame that may follow a bare echo. Nothing arriving
    /// within `byte_timeout` keeps the echo-only outcome.
    fn read_continuation(
        &mut self,
        echo_only: Outcome<N>,
    ) -> Result<Outcome<N>, FirestingError<IF::Error>> {
        let byte_timeout = self.config.byte_timeout;
        if !self.wait_for_data(byte_timeout)? {
            return Ok(echo_only);
        }
        let outcome = match self.read_frame()? {
            FrameStatus::Terminated => Outcome::EchoMatch(self.buffer.clone()),
            FrameStatus::Silent => echo_only,
            FrameStatus::Unterminated => Outcome::EchoMismatch {
                raw: self.buffer.clone(),
                truncated: true,
            },
        };
        Ok(outcome)
    }
}

fn has_field<const N: usize>(payload: &ResponseBuffer<N>) -> bool {
    payload.as_bytes().iter().any(|b| !b.is_ascii_whitespace())
}
