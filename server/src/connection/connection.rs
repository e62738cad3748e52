use std::net::SocketAddr;

use pairup_shared::Identity;

use crate::intent::IntentTracker;

/// Server-side state of one transport session
pub struct Connection {
    pub address: SocketAddr,
    identity: Option<Identity>,
    pub intents: IntentTracker,
}

impl Connection {
    pub fn new(address: &SocketAddr) -> Self {
        Self {
            address: *address,
            identity: None,
            intents: IntentTracker::new(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    /// Records a claim, returning the identity previously claimed if it
    /// differs from the new one
    pub fn claim_identity(&mut self, identity: &Identity) -> Option<Identity> {
        match self.identity.replace(identity.clone()) {
            Some(previous) if &previous != identity => Some(previous),
            _ => None,
        }
    }

    pub fn take_identity(&mut self) -> Option<Identity> {
        self.identity.take()
    }
}
