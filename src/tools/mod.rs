//! Tool access: backends, the registry, and the invoker.

pub mod backend;
pub mod invoker;
pub mod registry;
pub mod sanitize;

pub use backend::{connect_or_fallback, LiveBackend, SessionMode, SnapshotBackend, ToolBackend};
pub use invoker::ToolInvoker;
pub use registry::ToolRegistry;
