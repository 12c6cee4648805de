//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, in_memory::InMemory, USERS_EMAIL_CONSTRAINT},
        Database,
    },
};

impl Database<Select<By<Option<User>, user::Id>>> for InMemory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state.read().await.users.get(&id).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for InMemory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let state = self.state.read().await;
        Ok(state
            .emails
            .get(AsRef::<str>::as_ref(email))
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}

impl Database<Insert<User>> for InMemory
where
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<User>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut guard = self.state.write().await;
        // Split the borrow, so the index and the table are addressable
        // simultaneously.
        let state = &mut *guard;

        if let Some(owner) = state.emails.get(AsRef::<str>::as_ref(&user.email)) {
            if *owner != user.id {
                return Err(tracerr::new!(database::Error::InMemory(
                    database::in_memory::Error::UniqueViolation {
                        constraint: USERS_EMAIL_CONSTRAINT,
                    },
                )));
            }
        }

        if let Some(prev) = state.users.get(&user.id) {
            if prev.email != user.email {
                drop(state.emails.remove(AsRef::<str>::as_ref(&prev.email)));
            }
        }
        drop(state.emails.insert(
            AsRef::<str>::as_ref(&user.email).to_owned(),
            user.id,
        ));
        drop(state.users.insert(user.id, user));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::DateTime;

    use super::{By, Database as _, InMemory, Insert, Select, Update};
    use crate::domain::{user, User};

    fn sample_user(email: &str) -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Sample User").unwrap(),
            email: user::Email::new(email).unwrap(),
            password_hash: user::PasswordHash::new(
                &user::Password::new("secret").unwrap(),
            )
            .unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn selects_inserted_user_by_id_and_email() {
        let db = InMemory::new();
        let user = sample_user("asha@example.com");

        db.execute(Insert(user.clone())).await.unwrap();

        let by_id = db
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.email, user.email);

        let by_email = db
            .execute(Select(By::<Option<User>, _>::new(&user.email)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn select_of_absent_user_returns_none() {
        let db = InMemory::new();

        let missing = db
            .execute(Select(By::<Option<User>, _>::new(user::Id::new())))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn insert_rejects_occupied_email() {
        let db = InMemory::new();

        db.execute(Insert(sample_user("asha@example.com")))
            .await
            .unwrap();
        let err = db
            .execute(Insert(sample_user("asha@example.com")))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_unique_violation(Some(
            super::USERS_EMAIL_CONSTRAINT
        )));
    }

    #[tokio::test]
    async fn update_reindexes_changed_email() {
        let db = InMemory::new();
        let mut user = sample_user("old@example.com");

        db.execute(Insert(user.clone())).await.unwrap();

        let old_email = user.email.clone();
        user.email = user::Email::new("new@example.com").unwrap();
        db.execute(Update(user.clone())).await.unwrap();

        let stale = db
            .execute(Select(By::<Option<User>, _>::new(&old_email)))
            .await
            .unwrap();
        assert!(stale.is_none());

        // The freed email is takeable again.
        db.execute(Insert(sample_user("old@example.com")))
            .await
            .unwrap();
    }
}
