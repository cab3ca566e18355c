//! Session management
//!
//! - `identity`: the operator record and login/registration payloads
//! - `storage`: durable key-value backends
//! - `store`: the session store shared by the gateway and API wrappers

pub mod identity;
pub mod storage;
pub mod store;

#[cfg(test)]
mod tests;

pub use identity::{Credentials, Identity, Registration};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{LoginRejected, SessionStore, USER_ID_HEADER, USER_ROLE_HEADER};
