//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use async_trait::async_trait;

use crate::core::dataset::CountryDataset;
use crate::core::state::App;
use crate::store::{
    Color, LocalStore, MemoryBlobStore, Snapshot, StoreError, UserId, VisitStore,
};

/// A store whose every call fails as if the server were down.
pub struct FailingStore;

fn unreachable_err() -> StoreError {
    StoreError::Network("connection refused".to_string())
}

#[async_trait]
impl VisitStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Err(unreachable_err())
    }

    async fn add_country(&self, _query: &str) -> Result<(), StoreError> {
        Err(unreachable_err())
    }

    async fn delete_country(&self, _query: &str) -> Result<(), StoreError> {
        Err(unreachable_err())
    }

    async fn switch_user(&self, _user_id: UserId) -> Result<(), StoreError> {
        Err(unreachable_err())
    }

    async fn add_user(&self, _name: &str, _color: Color) -> Result<UserId, StoreError> {
        Err(unreachable_err())
    }

    async fn delete_user(&self, _user_id: UserId) -> Result<(), StoreError> {
        Err(unreachable_err())
    }
}

/// A fresh local store over memory with the builtin dataset.
///
/// Starts with only the default "Family" user (id 1).
pub fn test_local_store() -> LocalStore {
    LocalStore::new(
        Arc::new(MemoryBlobStore::new()),
        Arc::new(CountryDataset::builtin()),
    )
}

/// A local store with Family (id 1), Angela (id 2) and Jack (id 3). Jack is current.
pub async fn seeded_local_store() -> LocalStore {
    let store = test_local_store();
    store
        .add_user("Angela", Color::Blue)
        .await
        .expect("seed user Angela");
    store
        .add_user("Jack", Color::Pink)
        .await
        .expect("seed user Jack");
    store
}

/// Creates a test App over a fresh in-memory local store.
pub fn test_app() -> App {
    App::new(
        Arc::new(test_local_store()),
        Arc::new(CountryDataset::builtin()),
    )
}
