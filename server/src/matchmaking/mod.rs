mod error;
mod match_engine;
mod pairing;
mod waiting_queue;

pub use error::{MatchError, PairingError};
pub use match_engine::{Eviction, MatchAttempt, MatchEngine, MatchTicket};
pub use pairing::{LogPairing, MatchPair, PairingHandler};
pub use waiting_queue::{Waiter, WaitingQueue};
