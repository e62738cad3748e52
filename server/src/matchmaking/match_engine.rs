use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use pairup_shared::{Button, ContentId, Identity, Instant, BUTTON_COOLDOWN, WAITING_EVICTION};

use crate::{
    matchmaking::{MatchError, MatchPair, Waiter, WaitingQueue},
    ConnectionKey,
};

/// Proof of a pair formed by [`MatchEngine::attempt_match`]. The
/// initiator's match-lock stays held until the ticket is handed back to
/// [`MatchEngine::finish`].
#[must_use]
#[derive(Debug)]
pub struct MatchTicket {
    pair: MatchPair,
}

impl MatchTicket {
    pub fn pair(&self) -> &MatchPair {
        &self.pair
    }
}

#[must_use]
#[derive(Debug)]
pub enum MatchAttempt {
    /// No opposing waiter, the caller was pushed onto its own queue
    Waiting { content_id: ContentId, button: Button },
    Paired(MatchTicket),
}

/// A waiter removed because nobody paired with it in time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eviction {
    pub connection: ConnectionKey,
    pub identity: Identity,
    pub content_id: ContentId,
    pub button: Button,
}

struct PendingEviction {
    content_id: ContentId,
    button: Button,
    deadline: Instant,
}

#[derive(Default)]
struct ContentQueues {
    a: WaitingQueue,
    b: WaitingQueue,
}

impl ContentQueues {
    fn queue(&self, button: Button) -> &WaitingQueue {
        match button {
            Button::A => &self.a,
            Button::B => &self.b,
        }
    }

    fn queue_mut(&mut self, button: Button) -> &mut WaitingQueue {
        match button {
            Button::A => &mut self.a,
            Button::B => &mut self.b,
        }
    }
}

/// Pairs connections pressing opposite buttons on the same content.
///
/// Every queue mutation of an attempt happens inside one call, so no other
/// attempt can observe a half-applied check-pop-push sequence. The only
/// state that outlives a call is the match-lock of a paired initiator,
/// which is released by [`MatchEngine::finish`].
pub struct MatchEngine {
    cooldown: Duration,
    eviction_wait: Duration,
    queues: HashMap<ContentId, ContentQueues>,
    last_pressed: HashMap<ConnectionKey, Instant>,
    in_flight: HashSet<ConnectionKey>,
    evictions: HashMap<ConnectionKey, PendingEviction>,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchEngine {
    pub fn new() -> Self {
        Self {
            cooldown: BUTTON_COOLDOWN,
            eviction_wait: WAITING_EVICTION,
            queues: HashMap::new(),
            last_pressed: HashMap::new(),
            in_flight: HashSet::new(),
            evictions: HashMap::new(),
        }
    }

    pub fn attempt_match(
        &mut self,
        connection: &ConnectionKey,
        button: &str,
        content_id: &ContentId,
        identity: &Identity,
        now: &Instant,
    ) -> Result<MatchAttempt, MatchError> {
        let button: Button = button.parse().map_err(|_| MatchError::InvalidButton {
            button: button.to_string(),
            content_id: content_id.clone(),
        })?;

        self.consume_cooldown(connection, button, content_id, now)?;

        if self.in_flight.contains(connection) {
            return Err(MatchError::ConcurrentAttempt {
                connection: *connection,
            });
        }
        self.in_flight.insert(*connection);

        self.evictions
            .entry(*connection)
            .or_insert_with(|| PendingEviction {
                content_id: content_id.clone(),
                button,
                deadline: now.offset(self.eviction_wait),
            });

        let partner = self
            .queues_mut(content_id)
            .queue_mut(button.opposite())
            .take_partner_for(identity);

        if let Some(partner) = partner {
            self.cancel_eviction(&partner.connection, content_id, button.opposite());
            return Ok(MatchAttempt::Paired(MatchTicket {
                pair: MatchPair {
                    content_id: content_id.clone(),
                    initiator: identity.clone(),
                    initiator_connection: *connection,
                    initiator_button: button,
                    partner: partner.identity,
                    partner_connection: partner.connection,
                },
            }));
        }

        self.queues_mut(content_id).queue_mut(button).push(Waiter {
            identity: identity.clone(),
            connection: *connection,
        });
        self.in_flight.remove(connection);

        Ok(MatchAttempt::Waiting {
            content_id: content_id.clone(),
            button,
        })
    }

    /// Releases the initiator's match-lock. When the pairing side-effect
    /// succeeded the initiator's eviction is cancelled too; after a failure
    /// it stays armed.
    pub fn finish(&mut self, ticket: MatchTicket, paired: bool) -> MatchPair {
        let MatchTicket { pair } = ticket;
        self.in_flight.remove(&pair.initiator_connection);
        if paired {
            self.evictions.remove(&pair.initiator_connection);
        }
        pair
    }

    /// Fires every eviction whose deadline has been reached. Each fired
    /// eviction clears its handle, and reports the waiter only if it was
    /// still queued.
    pub fn poll_evictions(&mut self, now: &Instant) -> Vec<Eviction> {
        let mut due: Vec<(Instant, ConnectionKey)> = self
            .evictions
            .iter()
            .filter(|(_, pending)| !pending.deadline.is_after(now))
            .map(|(connection, pending)| (pending.deadline, *connection))
            .collect();
        due.sort();

        let mut output = Vec::new();
        for (_, connection) in due {
            let Some(pending) = self.evictions.remove(&connection) else {
                continue;
            };
            let Some(queues) = self.queues.get_mut(&pending.content_id) else {
                continue;
            };
            if let Some(waiter) = queues.queue_mut(pending.button).remove_connection(&connection) {
                output.push(Eviction {
                    connection,
                    identity: waiter.identity,
                    content_id: pending.content_id,
                    button: pending.button,
                });
            }
        }
        output
    }

    /// Forgets everything about a torn-down connection: its queue entries,
    /// cooldown, match-lock and pending eviction. Returns how many queue
    /// entries were removed.
    pub fn purge_connection(&mut self, connection: &ConnectionKey) -> usize {
        self.last_pressed.remove(connection);
        self.in_flight.remove(connection);
        self.withdraw_connection(connection)
    }

    /// Takes a connection out of every queue and drops its pending eviction,
    /// keeping its cooldown. Used when the connection changes identity.
    pub fn withdraw_connection(&mut self, connection: &ConnectionKey) -> usize {
        self.evictions.remove(connection);

        let mut removed = 0;
        for queues in self.queues.values_mut() {
            removed += queues.a.remove_all_for(connection);
            removed += queues.b.remove_all_for(connection);
        }
        removed
    }

    pub fn waiting(&self, content_id: &ContentId, button: Button) -> Vec<Identity> {
        self.queues
            .get(content_id)
            .map(|queues| queues.queue(button).identities())
            .unwrap_or_default()
    }

    pub fn is_cooling_down(&self, connection: &ConnectionKey, now: &Instant) -> bool {
        self.last_pressed
            .get(connection)
            .is_some_and(|last| last.elapsed(now) < self.cooldown)
    }

    pub fn is_in_flight(&self, connection: &ConnectionKey) -> bool {
        self.in_flight.contains(connection)
    }

    pub fn has_pending_eviction(&self, connection: &ConnectionKey) -> bool {
        self.evictions.contains_key(connection)
    }

    // Private methods

    fn consume_cooldown(
        &mut self,
        connection: &ConnectionKey,
        button: Button,
        content_id: &ContentId,
        now: &Instant,
    ) -> Result<(), MatchError> {
        if let Some(last) = self.last_pressed.get(connection) {
            if last.elapsed(now) < self.cooldown {
                return Err(MatchError::CoolingDown {
                    connection: *connection,
                    button,
                    content_id: content_id.clone(),
                });
            }
        }
        self.last_pressed.insert(*connection, *now);
        Ok(())
    }

    fn queues_mut(&mut self, content_id: &ContentId) -> &mut ContentQueues {
        self.queues.entry(content_id.clone()).or_default()
    }

    fn cancel_eviction(&mut self, connection: &ConnectionKey, content_id: &ContentId, button: Button) {
        let targets_queue = self
            .evictions
            .get(connection)
            .is_some_and(|pending| &pending.content_id == content_id && pending.button == button);
        if targets_queue {
            self.evictions.remove(connection);
        }
    }
}
