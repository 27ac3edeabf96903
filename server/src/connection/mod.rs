mod avatar_connection;
mod circuit;
mod connection_manager;
mod error;

pub use avatar_connection::AvatarConnection;
pub use circuit::{CapsControl, CircuitData, UdpCircuit};
pub use connection_manager::AvatarConnectionManager;
pub use error::ConnectionError;
