mod server_events;

pub use server_events::{
    ConnectEvent, DisconnectEvent, DisconnectReason, ErrorEvent, IdentifyEvent, MatchEvent,
    ServerEvent, ServerEvents, WaitingEndedEvent,
};
