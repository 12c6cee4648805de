//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// State lives as long as the process does: nothing is persisted across
/// restarts.
#[derive(Clone, Debug, Default)]
pub struct InMemory {
    /// Shared state of this [`InMemory`] database.
    state: Arc<RwLock<State>>,
}

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// State of an [`InMemory`] database.
#[derive(Debug, Default)]
struct State {
    /// [`User`]s of the platform, identified by [`user::Id`].
    users: HashMap<user::Id, User>,

    /// Index of [`user::Id`]s by [`user::Email`].
    ///
    /// Guards the [`USERS_EMAIL_CONSTRAINT`] invariant.
    ///
    /// [`USERS_EMAIL_CONSTRAINT`]: crate::infra::database::USERS_EMAIL_CONSTRAINT
    emails: HashMap<String, user::Id>,
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint violation.
    #[display("`{constraint}` constraint violation")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation { constraint: c } => {
                constraint.map_or(true, |name| name == *c)
            }
        }
    }
}
