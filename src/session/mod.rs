//! Session lifecycle management.
//!
//! One active session per identity, enforced transactionally by the store;
//! the append-only log is the durable history.

pub mod identity;
pub mod store;

pub use identity::Identity;
pub use store::{EventType, Session, SessionLogEntry, SessionStatus, SessionStore, StoreStats};
