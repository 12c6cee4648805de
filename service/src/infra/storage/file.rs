//! File-backed [`Storage`] implementation.

use std::{io, path::PathBuf};

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error as StdError, From};
use tokio::fs;
use tracerr::Traced;

use crate::domain::user::session::Token;

use super::{Error as StorageError, Key, Storage};

/// [`Storage`] persisting values as files under a directory.
///
/// Each [`Key`] maps to one file named after it, holding the raw [`Token`]
/// string.
#[derive(Clone, Debug)]
pub struct File {
    /// Directory the files are stored in.
    dir: PathBuf,
}

impl File {
    /// Creates a new [`File`] storage rooted at the provided directory.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path the provided [`Key`] is stored under.
    fn path(&self, key: &Key) -> PathBuf {
        self.dir.join(AsRef::<str>::as_ref(key))
    }
}

impl Storage<Insert<(Key, Token)>> for File {
    type Ok = ();
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Insert((key, token)): Insert<(Key, Token)>,
    ) -> Result<Self::Ok, Self::Err> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        fs::write(self.path(&key), token.as_ref().as_bytes())
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl<'k> Storage<Select<By<Option<Token>, &'k Key>>> for File {
    type Ok = Option<Token>;
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Token>, &'k Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        match fs::read_to_string(self.path(by.into_inner())).await {
            Ok(token) => {
                // SAFETY: The file only ever holds a previously stored
                //         `Token`.
                #[expect(unsafe_code, reason = "invariants are preserved")]
                let token = unsafe { Token::new_unchecked(token) };
                Ok(Some(token))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(tracerr::map_from(tracerr::new!(Error::from(e)))),
        }
    }
}

impl<'k> Storage<Delete<&'k Key>> for File {
    type Ok = ();
    type Err = Traced<StorageError>;

    async fn execute(
        &self,
        Delete(key): Delete<&'k Key>,
    ) -> Result<Self::Ok, Self::Err> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            // Removing an absent value is a no-op, as in any map.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(tracerr::map_from(tracerr::new!(Error::from(e)))),
        }
    }
}

/// Error of the [`File`] storage.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failure.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),
}
