//! [`Database`]-related implementations.

pub mod in_memory;

use derive_more::{Display, Error as StdError, From};

pub use self::in_memory::InMemory;

/// Database operation.
pub use common::Handler as Database;

/// Name of the constraint guarding [`user::Email`] uniqueness.
///
/// [`user::Email`]: crate::domain::user::Email
pub const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`InMemory`] error.
    InMemory(in_memory::Error),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::InMemory(e) => e.is_unique_violation(constraint),
        }
    }
}
