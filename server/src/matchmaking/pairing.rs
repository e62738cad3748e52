use log::info;

use pairup_shared::{Button, ContentId, Identity};

use crate::{matchmaking::PairingError, ConnectionKey};

/// Two identities matched on the same content with opposite buttons
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchPair {
    pub content_id: ContentId,
    /// The identity whose press completed the pair
    pub initiator: Identity,
    pub initiator_connection: ConnectionKey,
    pub initiator_button: Button,
    /// The identity that was waiting in the opposing queue
    pub partner: Identity,
    pub partner_connection: ConnectionKey,
}

impl MatchPair {
    pub fn describe(&self) -> String {
        format!(
            "Making a pair: {} and {} contentId:{}",
            self.initiator, self.partner, self.content_id
        )
    }
}

/// Side-effect run for every formed pair, after the waiting queues have
/// been updated. Returning an error reports a generic failure to the
/// initiating connection; the pair is not re-queued.
pub trait PairingHandler: Send {
    fn on_pair(&mut self, pair: &MatchPair) -> Result<(), PairingError>;
}

impl<F> PairingHandler for F
where
    F: FnMut(&MatchPair) -> Result<(), PairingError> + Send,
{
    fn on_pair(&mut self, pair: &MatchPair) -> Result<(), PairingError> {
        self(pair)
    }
}

/// Default handler, only records the pair in the log
pub struct LogPairing;

impl PairingHandler for LogPairing {
    fn on_pair(&mut self, pair: &MatchPair) -> Result<(), PairingError> {
        info!("{}", pair.describe());
        Ok(())
    }
}
