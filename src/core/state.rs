//! # Application State
//!
//! What the presentation layer reads from. Domain logic only, no rendering.
//!
//! ```text
//! App
//! ├── store: Arc<dyn VisitStore>      // local or remote backend
//! ├── dataset: Arc<CountryDataset>    // reference countries
//! ├── snapshot: Snapshot              // last successful fetch
//! ├── stats: Stats                    // derived from snapshot
//! ├── error: Option<String>           // inline notice from a failed action
//! ├── load_error: Option<String>      // persistent "cannot load" notice
//! └── status_message: String          // last thing that happened
//! ```
//!
//! Writes go through `dispatch()`, which always ends with a fresh fetch.
//! A failed fetch never clears the previous snapshot.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::action::Action;
use crate::core::dataset::CountryDataset;
use crate::core::stats::{self, Stats};
use crate::store::{Snapshot, StoreError, VisitStore};

pub struct App {
    pub store: Arc<dyn VisitStore>,
    pub dataset: Arc<CountryDataset>,
    pub snapshot: Snapshot,
    pub stats: Stats,
    pub error: Option<String>,
    pub load_error: Option<String>,
    pub status_message: String,
}

impl App {
    pub fn new(store: Arc<dyn VisitStore>, dataset: Arc<CountryDataset>) -> Self {
        Self {
            store,
            dataset,
            snapshot: Snapshot::default(),
            stats: Stats::default(),
            error: None,
            load_error: None,
            status_message: String::from("Welcome to Footprints!"),
        }
    }

    /// Fetches a new snapshot and recomputes the stats.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        match self.store.snapshot().await {
            Ok(snapshot) => {
                self.stats = stats::compute(&snapshot, &self.dataset);
                debug!(
                    "Snapshot refreshed: {} users, current {:?}",
                    snapshot.users.len(),
                    snapshot.current_user_id
                );
                self.snapshot = snapshot;
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load data from {} store: {}", self.store.name(), e);
                self.load_error = Some(format!("Cannot load data: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// Applies one action, then re-fetches.
    ///
    /// A failed mutation sets `error` and leaves the snapshot as it was.
    pub async fn dispatch(&mut self, action: Action) -> Result<(), StoreError> {
        info!("Dispatching: {}", action);
        if action.is_mutation() {
            match self.apply(&action).await {
                Ok(message) => {
                    self.error = None;
                    self.status_message = message;
                }
                Err(e) => {
                    warn!("Action failed ({}): {}", action, e);
                    self.error = Some(e.user_message().to_string());
                    return Err(e);
                }
            }
        }
        self.refresh().await
    }

    async fn apply(&self, action: &Action) -> Result<String, StoreError> {
        let store = &self.store;
        match action {
            Action::Refresh => Ok(String::new()),
            Action::AddCountry(query) => {
                store.add_country(query).await?;
                Ok(format!("Added {}", query.trim()))
            }
            Action::DeleteCountry(query) => {
                store.delete_country(query).await?;
                Ok(format!("Removed {}", query.trim()))
            }
            Action::SwitchUser(id) => {
                store.switch_user(*id).await?;
                Ok(format!("Switched to user {id}"))
            }
            Action::AddUser { name, color } => {
                let id = store.add_user(name, *color).await?;
                Ok(format!("Welcome, {} (user {id})", name.trim()))
            }
            Action::DeleteUser(id) => {
                store.delete_user(*id).await?;
                Ok(format!("Deleted user {id}"))
            }
        }
    }
}
