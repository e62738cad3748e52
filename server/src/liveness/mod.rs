mod liveness_config;
mod liveness_supervisor;

pub use liveness_config::LivenessConfig;
pub use liveness_supervisor::{LivenessAction, LivenessState, LivenessSupervisor, ReplyOutcome};
