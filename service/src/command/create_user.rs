//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            created_at: DateTime::now().coerce(),
        };

        // `Insert` re-checks the email index, so a racing registration with
        // the same address still fails.
        if let Err(e) = self.database().execute(Insert(user.clone())).await {
            return if e
                .as_ref()
                .is_unique_violation(Some(database::USERS_EMAIL_CONSTRAINT))
            {
                Err(tracerr::new!(E::EmailOccupied(user.email)))
            } else {
                Err(e).map_err(tracerr::map_from_and_wrap!(=> E))
            };
        }

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Failed to hash the provided [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(bcrypt::BcryptError),
}

#[cfg(test)]
mod tests {
    use secrecy::SecretBox;

    use super::{CreateUser, ExecutionError};
    use crate::{
        domain::user,
        infra::InMemory,
        Command as _, Config, Service,
    };

    fn test_service() -> Service<InMemory> {
        let secret = b"test-secret";
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
                session_lifetime: std::time::Duration::from_secs(
                    24 * 60 * 60,
                ),
            },
            InMemory::new(),
        )
    }

    fn register_cmd(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("Asha Rao").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::init_with(|| {
                user::Password::new("secret-pass").unwrap()
            }),
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let service = test_service();

        let user = service
            .execute(register_cmd("asha@example.com"))
            .await
            .unwrap();

        assert_eq!(AsRef::<str>::as_ref(&user.email), "asha@example.com");
        assert!(user
            .password_hash
            .verify(&user::Password::new("secret-pass").unwrap()));
        assert_ne!(user.password_hash.to_string(), "secret-pass");
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let service = test_service();

        drop(
            service
                .execute(register_cmd("asha@example.com"))
                .await
                .unwrap(),
        );
        let err = service
            .execute(register_cmd("asha@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::EmailOccupied(_)
        ));
    }
}
