//! Local backend: one JSON document in a [`BlobStore`].
//!
//! Every operation loads the whole `TrackerDocument`, applies the change to
//! that copy and writes it back. Validation failures return before the
//! write, so the stored document only ever moves between complete states.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::dataset::CountryDataset;
use crate::store::backend::{StoreError, VisitStore, validate_user_name};
use crate::store::blob::BlobStore;
use crate::store::types::{
    Color, CountryCode, CountryVisitCount, Snapshot, User, UserId, VisitedCountry,
};

/// Key of the tracker document inside the blob store.
pub const DOCUMENT_KEY: &str = "tracker";

/// The user a brand-new tracker starts with.
pub const DEFAULT_USER_NAME: &str = "Family";
pub const DEFAULT_USER_COLOR: Color = Color::Blue;

/// Everything the local backend persists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackerDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub visits: Vec<VisitedCountry>,
    #[serde(default)]
    pub current_user_id: Option<UserId>,
    /// Next id handed out by `add_user`. Only ever grows.
    #[serde(default = "initial_user_id")]
    pub next_user_id: i64,
    /// Unix timestamp of the last successful write.
    #[serde(default)]
    pub updated_at: i64,
}

fn initial_user_id() -> i64 {
    1
}

impl Default for TrackerDocument {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            visits: Vec::new(),
            current_user_id: None,
            next_user_id: initial_user_id(),
            updated_at: 0,
        }
    }
}

impl TrackerDocument {
    /// A tracker that has never been saved: one default user, already current.
    pub fn first_run() -> Self {
        let id = UserId(initial_user_id());
        Self {
            users: vec![User {
                id,
                name: DEFAULT_USER_NAME.to_string(),
                color: DEFAULT_USER_COLOR,
            }],
            current_user_id: Some(id),
            next_user_id: id.0 + 1,
            ..Default::default()
        }
    }

    fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn first_user_id(&self) -> Option<UserId> {
        self.users.iter().map(|u| u.id).min()
    }

    /// Re-establishes "a current user exists whenever users exist" for
    /// documents written by hand or by older versions.
    fn normalize(&mut self) {
        let current_valid = self.current_user_id.is_some_and(|id| self.has_user(id));
        if !current_valid {
            self.current_user_id = self.first_user_id();
        }
        if let Some(max) = self.users.iter().map(|u| u.id.0).max()
            && self.next_user_id <= max
        {
            self.next_user_id = max + 1;
        }
    }

    fn require_current_user(&self) -> Result<UserId, StoreError> {
        self.current_user_id
            .filter(|id| self.has_user(*id))
            .ok_or_else(|| StoreError::NotFound("No current user selected".to_string()))
    }

    /// Derives the aggregate view the UI and stats engine consume.
    pub fn snapshot(&self, dataset: &CountryDataset) -> Snapshot {
        let current = self.current_user_id;

        let countries: Vec<CountryCode> = self
            .visits
            .iter()
            .filter(|v| Some(v.user_id) == current)
            .map(|v| v.country_code.clone())
            .collect();

        // Group by code, keeping first-appearance order.
        let mut all_visits: Vec<CountryVisitCount> = Vec::new();
        let mut slot: HashMap<&CountryCode, usize> = HashMap::new();
        for visit in &self.visits {
            match slot.get(&visit.country_code) {
                Some(&idx) => all_visits[idx].visit_count += 1,
                None => {
                    slot.insert(&visit.country_code, all_visits.len());
                    all_visits.push(CountryVisitCount {
                        country_code: visit.country_code.clone(),
                        visit_count: 1,
                    });
                }
            }
        }

        let color = current.and_then(|id| self.users.iter().find(|u| u.id == id).map(|u| u.color));

        Snapshot {
            total: countries.len(),
            countries,
            all_visits,
            all_user_visits: self.visits.clone(),
            total_world_countries: dataset.len(),
            users: self.users.clone(),
            color,
            current_user_id: current,
        }
    }

    pub fn add_visit(
        &mut self,
        dataset: &CountryDataset,
        query: &str,
    ) -> Result<CountryCode, StoreError> {
        let country = dataset
            .resolve(query)
            .ok_or_else(|| StoreError::NotFound("Country not found".to_string()))?;
        let user_id = self.require_current_user()?;

        let exists = self
            .visits
            .iter()
            .any(|v| v.user_id == user_id && v.country_code == country.code);
        if exists {
            return Err(StoreError::Conflict(format!(
                "{} already added",
                country.name
            )));
        }

        self.visits.push(VisitedCountry {
            country_code: country.code.clone(),
            user_id,
        });
        Ok(country.code.clone())
    }

    pub fn remove_visit(
        &mut self,
        dataset: &CountryDataset,
        query: &str,
    ) -> Result<CountryCode, StoreError> {
        let country = dataset
            .resolve(query)
            .ok_or_else(|| StoreError::NotFound("Country not found".to_string()))?;
        let user_id = self.require_current_user()?;

        let position = self
            .visits
            .iter()
            .position(|v| v.user_id == user_id && v.country_code == country.code)
            .ok_or_else(|| {
                StoreError::NotFound(format!("{} is not in the visited list", country.name))
            })?;
        self.visits.remove(position);
        Ok(country.code.clone())
    }

    pub fn switch_user(&mut self, user_id: UserId) -> Result<(), StoreError> {
        if !self.has_user(user_id) {
            return Err(StoreError::NotFound(format!("User {user_id} does not exist")));
        }
        self.current_user_id = Some(user_id);
        Ok(())
    }

    pub fn add_user(&mut self, name: &str, color: Color) -> Result<UserId, StoreError> {
        let name = validate_user_name(name)?;
        let id = UserId(self.next_user_id);
        self.next_user_id += 1;
        self.users.push(User {
            id,
            name: name.to_string(),
            color,
        });
        self.current_user_id = Some(id);
        Ok(id)
    }

    pub fn remove_user(&mut self, user_id: UserId) -> Result<(), StoreError> {
        let position = self
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("User {user_id} does not exist")))?;

        // Visits go first, then the user row.
        self.visits.retain(|v| v.user_id != user_id);
        self.users.remove(position);

        if self.current_user_id == Some(user_id) {
            self.current_user_id = self.first_user_id();
        }
        Ok(())
    }
}

/// Visit store persisted as a single document.
pub struct LocalStore {
    blobs: Arc<dyn BlobStore>,
    dataset: Arc<CountryDataset>,
    key: String,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(blobs: Arc<dyn BlobStore>, dataset: Arc<CountryDataset>) -> Self {
        Self {
            blobs,
            dataset,
            key: DOCUMENT_KEY.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Stores the document under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn load_document(&self) -> Result<TrackerDocument, StoreError> {
        let mut document = match self.blobs.read(&self.key)? {
            Some(json) => serde_json::from_str::<TrackerDocument>(&json).map_err(|e| {
                warn!("Tracker document '{}' is corrupt: {}", self.key, e);
                StoreError::Storage(format!("corrupt tracker document: {e}"))
            })?,
            None => {
                debug!(
                    "No tracker document under '{}', starting with user {:?}",
                    self.key, DEFAULT_USER_NAME
                );
                TrackerDocument::first_run()
            }
        };
        document.normalize();
        Ok(document)
    }

    fn save_document(&self, document: &TrackerDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Storage(format!("failed to encode tracker document: {e}")))?;
        self.blobs.write(&self.key, &json)
    }

    /// Load, apply `op`, write back. Nothing is written if `op` fails.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut TrackerDocument, &CountryDataset) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Storage("local store lock poisoned".to_string()))?;
        let mut document = self.load_document()?;
        let out = op(&mut document, &self.dataset)?;
        document.updated_at = Utc::now().timestamp();
        self.save_document(&document)?;
        Ok(out)
    }
}

#[async_trait]
impl VisitStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let document = self.load_document()?;
        Ok(document.snapshot(&self.dataset))
    }

    async fn add_country(&self, query: &str) -> Result<(), StoreError> {
        let code = self.mutate(|doc, dataset| doc.add_visit(dataset, query))?;
        info!("Recorded visit to {}", code);
        Ok(())
    }

    async fn delete_country(&self, query: &str) -> Result<(), StoreError> {
        let code = self.mutate(|doc, dataset| doc.remove_visit(dataset, query))?;
        info!("Removed visit to {}", code);
        Ok(())
    }

    async fn switch_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.mutate(|doc, _| doc.switch_user(user_id))?;
        info!("Switched to user {}", user_id);
        Ok(())
    }

    async fn add_user(&self, name: &str, color: Color) -> Result<UserId, StoreError> {
        let id = self.mutate(|doc, _| doc.add_user(name, color))?;
        info!("Created user {} ({})", id, color);
        Ok(id)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.mutate(|doc, _| doc.remove_user(user_id))?;
        info!("Deleted user {} and their visits", user_id);
        Ok(())
    }
}
