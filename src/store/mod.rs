//! # Visit Store
//!
//! Owns users, visit records and the current-user pointer behind the
//! [`VisitStore`] trait. Two interchangeable backends:
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │   dyn VisitStore     │
//!                 └──────────┬───────────┘
//!            ┌───────────────┴───────────────┐
//!            ▼                               ▼
//!     ┌─────────────┐                 ┌─────────────┐
//!     │ LocalStore  │                 │ RemoteStore │
//!     │ (BlobStore) │                 │  (reqwest)  │
//!     └─────────────┘                 └─────────────┘
//! ```
//!
//! The backend is picked once, in [`build_store`]; callers never branch on it.

pub mod backend;
pub mod backends;
pub mod blob;
pub mod types;

use std::sync::Arc;

use log::info;

pub use backend::{StoreError, VisitStore};
pub use backends::{LocalStore, RemoteStore};
pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use types::{Color, CountryCode, CountryVisitCount, Snapshot, User, UserId, VisitedCountry};

use crate::Backend;
use crate::core::config::ResolvedConfig;
use crate::core::dataset::CountryDataset;

/// Build a store from a resolved config's backend selection.
pub fn build_store(
    config: &ResolvedConfig,
    dataset: Arc<CountryDataset>,
) -> Result<Arc<dyn VisitStore>, StoreError> {
    match config.backend {
        Backend::Local => {
            let blobs = FileBlobStore::new(&config.data_dir)?;
            info!("Using local store at {}", blobs.dir().display());
            Ok(Arc::new(LocalStore::new(Arc::new(blobs), dataset)))
        }
        Backend::Remote => {
            let store = RemoteStore::new(Some(config.api_url.clone()));
            info!("Using remote store at {}", store.base_url());
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{TrackerConfig, resolve};

    #[test]
    fn test_build_store_local() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = resolve(&TrackerConfig::default(), Some(Backend::Local));
        config.data_dir = dir.path().join("data");

        let store = build_store(&config, Arc::new(CountryDataset::builtin())).unwrap();
        assert_eq!(store.name(), "local");
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn test_build_store_remote() {
        let mut config = resolve(&TrackerConfig::default(), Some(Backend::Remote));
        config.api_url = "http://127.0.0.1:9/api".to_string();

        let store = build_store(&config, Arc::new(CountryDataset::builtin())).unwrap();
        assert_eq!(store.name(), "remote");
    }
}
