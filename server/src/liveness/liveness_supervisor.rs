use std::{collections::HashMap, time::Duration};

use pairup_shared::{Identity, Instant, Timer};

use crate::{liveness::LivenessConfig, ConnectionKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessState {
    Idle,
    /// A probe is outstanding and the connection is terminated at `deadline`
    /// unless a qualifying reply arrives first
    ProbeSent { deadline: Instant },
}

/// What the owner of the supervisor must do after a poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessAction {
    SendProbe(ConnectionKey),
    Terminate(ConnectionKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The pending timeout was cancelled
    Confirmed,
    /// The reply was well-formed but the connection has not claimed an
    /// identity, so the timeout stays armed
    Unidentified,
    /// The reply carried no identity token
    Invalid,
    /// No probe was outstanding
    Unsolicited,
    UnknownConnection,
}

struct LivenessTracker {
    interval: Timer,
    state: LivenessState,
}

/// Runs the per-connection probe/timeout state machine.
///
/// The supervisor holds no clock of its own: [`LivenessSupervisor::poll`]
/// is called with the current instant and returns the probes to send and
/// the connections to terminate.
pub struct LivenessSupervisor {
    probe_interval: Duration,
    probe_timeout: Duration,
    trackers: HashMap<ConnectionKey, LivenessTracker>,
}

impl LivenessSupervisor {
    pub fn new(config: &LivenessConfig) -> Self {
        Self {
            probe_interval: config.probe_interval,
            probe_timeout: config.probe_timeout,
            trackers: HashMap::new(),
        }
    }

    /// Starts supervising a new connection. The first probe is due one
    /// interval from `now`.
    pub fn arm(&mut self, connection: &ConnectionKey, now: &Instant) {
        self.trackers.insert(
            *connection,
            LivenessTracker {
                interval: Timer::new(self.probe_interval, now),
                state: LivenessState::Idle,
            },
        );
    }

    /// Stops supervising a connection, dropping its interval and any pending
    /// timeout. Must be called on every teardown.
    pub fn disarm(&mut self, connection: &ConnectionKey) -> bool {
        self.trackers.remove(connection).is_some()
    }

    pub fn state(&self, connection: &ConnectionKey) -> Option<LivenessState> {
        self.trackers.get(connection).map(|tracker| tracker.state)
    }

    pub fn is_supervising(&self, connection: &ConnectionKey) -> bool {
        self.trackers.contains_key(connection)
    }

    pub fn receive_reply(
        &mut self,
        connection: &ConnectionKey,
        token: Option<&Identity>,
        identity_claimed: bool,
    ) -> ReplyOutcome {
        let Some(tracker) = self.trackers.get_mut(connection) else {
            return ReplyOutcome::UnknownConnection;
        };
        if !token.is_some_and(Identity::is_valid) {
            return ReplyOutcome::Invalid;
        }
        if !identity_claimed {
            return ReplyOutcome::Unidentified;
        }
        match tracker.state {
            LivenessState::Idle => ReplyOutcome::Unsolicited,
            LivenessState::ProbeSent { .. } => {
                tracker.state = LivenessState::Idle;
                ReplyOutcome::Confirmed
            }
        }
    }

    pub fn poll(&mut self, now: &Instant) -> Vec<LivenessAction> {
        let mut actions = Vec::new();

        for (connection, tracker) in self.trackers.iter_mut() {
            if let LivenessState::ProbeSent { deadline } = tracker.state {
                if !deadline.is_after(now) {
                    actions.push(LivenessAction::Terminate(*connection));
                    continue;
                }
            }

            if !tracker.interval.ringing(now) {
                continue;
            }
            tracker.interval.reset(now);

            // an interval tick while a probe is outstanding neither re-probes
            // nor extends the deadline
            if tracker.state == LivenessState::Idle {
                tracker.state = LivenessState::ProbeSent {
                    deadline: now.offset(self.probe_timeout),
                };
                actions.push(LivenessAction::SendProbe(*connection));
            }
        }

        for action in &actions {
            if let LivenessAction::Terminate(connection) = action {
                self.trackers.remove(connection);
            }
        }

        actions
    }
}
