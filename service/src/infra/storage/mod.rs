//! Client-side token [`Storage`] implementations.
//!
//! Persists the access [`Token`] between application runs under a
//! well-known [`Key`], so a client may resume its session without
//! re-authenticating.
//!
//! [`Token`]: crate::domain::user::session::Token

pub mod file;
pub mod memory;

use derive_more::{AsRef, Display, Error as StdError, From};

pub use self::{file::File, memory::Memory};

/// Storage operation.
pub use common::Handler as Storage;

/// [`Key`] the authentication [`Token`] is stored under.
///
/// [`Token`]: crate::domain::user::session::Token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key a stored value lives under.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Key(String);

impl Key {
    /// Returns the [`Key`] of the authentication [`Token`].
    ///
    /// [`Token`]: crate::domain::user::session::Token
    #[must_use]
    pub fn auth_token() -> Self {
        Self(AUTH_TOKEN_KEY.into())
    }
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`File`] storage error.
    File(file::Error),
}
