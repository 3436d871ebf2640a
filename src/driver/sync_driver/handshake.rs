// src/driver/sync_driver/handshake.rs

use super::{version_from_payload, Session, SyncFiresting};
use crate::common::{
    command::Command,
    dialect::Dialect,
    error::FirestingError,
    hal_traits::{FirestingSerial, FirestingTimer},
    response::Outcome,
};
use log::{debug, warn};

impl<IF, const N: usize> SyncFiresting<IF, N>
where
    IF: FirestingSerial + FirestingTimer,
{
    /// Opens the link and negotiates the firmware dialect.
    ///
    /// Each configured baud rate is tried in order with a `#VERS` probe. The
    /// first rate that draws a matching echo wins, and the reported version
    /// selects the dialect. If no rate answers, or the version cannot be read,
    /// the session stays `Unknown` and dialect-dependent commands are refused
    /// until the next successful handshake.
    ///
    /// `Err` is returned only for transport failures.
    pub fn establish(&mut self) -> Result<Session, FirestingError<IF::Error>> {
        self.session = Session::default();
        let probe = Command::version_query();

        for &baud in self.config.baud_candidates {
            debug!("probing at {} baud", baud);
            self.interface.open(baud).map_err(FirestingError::Io)?;
            self.session.baud_rate = Some(baud);
            self.interface.delay(self.config.open_settle);

            match self.transact(&probe)? {
                Outcome::NoResponse => {
                    debug!("no answer at {} baud", baud);
                }
                Outcome::EchoMismatch { raw, .. } => {
                    debug!("garbled answer at {} baud: {:?}", baud, raw);
                }
                Outcome::EchoMatch(payload) => {
                    self.discard_pending()?;
                    let version = version_from_payload(&payload);
                    let dialect = version.map_or(Dialect::Unknown, Dialect::from_version);
                    if dialect.is_known() {
                        debug!(
                            "connected at {} baud, firmware {:?}, {:?}",
                            baud, version, dialect
                        );
                    } else {
                        warn!("unrecognised firmware version in {:?}", payload);
                    }
                    self.session = Session {
                        dialect,
                        baud_rate: Some(baud),
                        version,
                    };
                    return Ok(self.session);
                }
            }
        }

        warn!("could not establish connection");
        self.session = Session::default();
        Ok(self.session)
    }
}
