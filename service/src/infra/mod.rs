//! Infrastructure layer.

pub mod database;
pub mod storage;

pub use self::{
    database::{in_memory, Database, InMemory},
    storage::Storage,
};
