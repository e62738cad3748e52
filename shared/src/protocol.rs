//! JSON wire protocol. Every frame is an object `{"event": <name>, "data":
//! <payload>}`, mirroring the named-event style of the browser clients.

pub mod client_message;
pub mod error;
pub mod server_message;
