//! [`Database`] operations of the [`InMemory`] client.
//!
//! [`Database`]: crate::infra::Database
//! [`InMemory`]: super::InMemory

mod user;
