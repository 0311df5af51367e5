mod channel;
mod connection;

pub use channel::{BoardChannel, ClientEvent, ServerEvent};
pub use connection::ClientConnection;
