//! Process-local [`Storage`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Delete, Insert, Select};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::domain::user::session::Token;

use super::{Error as StorageError, Key, Storage};

/// [`Storage`] keeping values in process memory only.
///
/// Nothing survives a restart, mirroring a client without any persistent
/// storage available.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`Token`]s by their [`Key`]s.
    state: Arc<RwLock<HashMap<Key, Token>>>,
}

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage<Insert<(Key, Token)>> for Memory {
    type Ok = ();
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Insert((key, token)): Insert<(Key, Token)>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state.write().await.insert(key, token));
        Ok(())
    }
}

impl<'k> Storage<Select<By<Option<Token>, &'k Key>>> for Memory {
    type Ok = Option<Token>;
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Token>, &'k Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.get(by.into_inner()).cloned())
    }
}

impl<'k> Storage<Delete<&'k Key>> for Memory {
    type Ok = ();
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Delete(key): Delete<&'k Key>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state.write().await.remove(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{By, Delete, Insert, Key, Memory, Select, Storage as _, Token};

    #[tokio::test]
    async fn round_trips_token_under_key() {
        let storage = Memory::new();
        let key = Key::auth_token();
        #[expect(unsafe_code, reason = "test fixture")]
        let token = unsafe { Token::new_unchecked("tok-1".into()) };

        storage
            .execute(Insert((key.clone(), token)))
            .await
            .unwrap();
        let stored = storage
            .execute(Select(By::<Option<Token>, _>::new(&key)))
            .await
            .unwrap();
        assert_eq!(stored.map(|t| t.to_string()), Some("tok-1".to_owned()));

        storage.execute(Delete(&key)).await.unwrap();
        let removed = storage
            .execute(Select(By::<Option<Token>, _>::new(&key)))
            .await
            .unwrap();
        assert!(removed.is_none());
    }
}
