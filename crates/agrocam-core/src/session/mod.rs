//! Session memory
//!
//! - `SessionContext`: history and shared state of one conversation
//! - `SessionStore`: storage abstraction with in-memory and Redis backends

mod context;
mod redis_store;
mod store;

pub use context::SessionContext;
pub use redis_store::{RedisStore, DEFAULT_PREFIX};
pub use store::{MemoryStore, SessionStore};

#[cfg(test)]
pub use store::MockSessionStore;
