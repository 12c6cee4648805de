//! [`Command`] for updating an [`user::Password`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Password;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an [`user::Password`].
#[derive(Clone, Debug, From)]
pub struct UpdateUserPassword {
    /// ID of the [`User`] which [`Password`] should be updated.
    pub user_id: user::Id,

    /// New [`Password`] of the [`User`].
    pub new_password: user::Password,

    /// Old [`Password`] of the [`User`].
    pub old_password: user::Password,
}

impl<Db> Command<UpdateUserPassword> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserPassword {
            user_id,
            new_password,
            old_password,
        } = cmd;

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if !user.password_hash.verify(&old_password) {
            return Err(tracerr::new!(E::WrongPassword));
        }

        user.password_hash = user::PasswordHash::new(&new_password)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to hash the provided [`Password`].
    #[display("Failed to hash `Password`: {_0}")]
    PasswordHash(bcrypt::BcryptError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Wrong old [`Password`] provided.
    #[display("Wrong old password")]
    WrongPassword,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretBox;

    use super::{ExecutionError, UpdateUserPassword};
    use crate::{
        command::{CreateUser, CreateUserSession},
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
                session_lifetime: Duration::from_secs(24 * 60 * 60),
            },
            InMemory::new(),
        )
    }

    async fn register(service: &Service<InMemory>) -> user::Id {
        service
            .execute(CreateUser {
                name: user::Name::new("Asha Rao").unwrap(),
                email: user::Email::new("asha@example.com").unwrap(),
                password: SecretBox::init_with(|| {
                    user::Password::new("old-password").unwrap()
                }),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn rejects_wrong_old_password() {
        let service = test_service();
        let user_id = register(&service).await;

        let err = service
            .execute(UpdateUserPassword {
                user_id,
                new_password: user::Password::new("new-password").unwrap(),
                old_password: user::Password::new("not-the-old-one").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongPassword));
    }

    #[tokio::test]
    async fn login_works_only_with_the_new_password() {
        let service = test_service();
        let user_id = register(&service).await;

        drop(
            service
                .execute(UpdateUserPassword {
                    user_id,
                    new_password: user::Password::new("new-password")
                        .unwrap(),
                    old_password: user::Password::new("old-password")
                        .unwrap(),
                })
                .await
                .unwrap(),
        );

        let old_attempt = service
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new("asha@example.com").unwrap(),
                password: SecretBox::init_with(|| {
                    user::Password::new("old-password").unwrap()
                }),
            })
            .await;
        assert!(old_attempt.is_err());

        let new_attempt = service
            .execute(CreateUserSession::ByCredentials {
                email: user::Email::new("asha@example.com").unwrap(),
                password: SecretBox::init_with(|| {
                    user::Password::new("new-password").unwrap()
                }),
            })
            .await;
        assert!(new_attempt.is_ok());
    }
}
