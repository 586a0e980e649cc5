//! Client-side protocol session for the tool-providing process.

pub mod session;
pub mod snapshot;
pub mod transport;
pub mod wire;

pub use session::{ProtocolSession, SessionState};
pub use snapshot::SnapshotStore;
pub use transport::{StdioTransport, Transport};
