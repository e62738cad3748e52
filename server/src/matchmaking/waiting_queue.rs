use std::collections::VecDeque;

use pairup_shared::Identity;

use crate::ConnectionKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waiter {
    pub identity: Identity,
    pub connection: ConnectionKey,
}

/// FIFO of identities waiting on one (content, button). Duplicates are not
/// rejected at the push site.
#[derive(Default)]
pub struct WaitingQueue {
    waiters: VecDeque<Waiter>,
}

impl WaitingQueue {
    pub fn push(&mut self, waiter: Waiter) {
        self.waiters.push_back(waiter);
    }

    /// Removes and returns the oldest waiter whose identity differs from
    /// `identity`. Waiters holding the same identity are skipped and keep
    /// their place.
    pub fn take_partner_for(&mut self, identity: &Identity) -> Option<Waiter> {
        let index = self
            .waiters
            .iter()
            .position(|waiter| &waiter.identity != identity)?;
        self.waiters.remove(index)
    }

    /// Removes the oldest waiter pushed by `connection`
    pub fn remove_connection(&mut self, connection: &ConnectionKey) -> Option<Waiter> {
        let index = self
            .waiters
            .iter()
            .position(|waiter| &waiter.connection == connection)?;
        self.waiters.remove(index)
    }

    /// Removes every waiter pushed by `connection`, returning how many
    pub fn remove_all_for(&mut self, connection: &ConnectionKey) -> usize {
        let before = self.waiters.len();
        self.waiters.retain(|waiter| &waiter.connection != connection);
        before - self.waiters.len()
    }

    pub fn identities(&self) -> Vec<Identity> {
        self.waiters
            .iter()
            .map(|waiter| waiter.identity.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}
