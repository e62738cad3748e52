pub mod connection;
pub mod connection_key;
pub mod io;
