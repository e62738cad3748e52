mod native;
mod timer;

pub use native::{Instant, TimeError, Timestamp};
pub use timer::Timer;
