//! Remote backend: the tracker REST API.
//!
//! Endpoints, relative to the base URL:
//! - `GET  data`                           → `Snapshot`
//! - `POST add            {country}`
//! - `POST delete-country {country}`
//! - `POST switch-user    {user}`
//! - `POST add-user       {name, color}`   → `{success, userId}`
//! - `POST delete-user    {user}`
//!
//! Failures come back as `{success: false, error}` with a non-2xx status and
//! are mapped onto `StoreError` by status code.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::store::backend::{StoreError, VisitStore, validate_user_name};
use crate::store::types::{Color, Snapshot, UserId};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize, Debug)]
struct CountryRequest<'a> {
    country: &'a str,
}

#[derive(Serialize, Debug)]
struct UserRequest {
    user: UserId,
}

#[derive(Serialize, Debug)]
struct NewUserRequest<'a> {
    name: &'a str,
    color: Color,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NewUserResponse {
    user_id: UserId,
}

/// Body of a failed call. `error` is the documented field; some servers
/// only send `message`.
#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-2xx response onto the shared error taxonomy.
fn error_from_status(status: u16, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        404 => StoreError::NotFound(message),
        409 => StoreError::Conflict(message),
        400 | 422 => StoreError::Validation(message),
        _ => StoreError::Api { status, message },
    }
}

// ============================================================================
// Store Implementation
// ============================================================================

/// Visit store backed by the tracker HTTP API.
pub struct RemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteStore {
    /// `base_url` normally comes from the resolved config, which has already
    /// applied `FOOTPRINTS_API_URL`. `None` falls back to the default.
    pub fn new(base_url: Option<String>) -> Self {
        let final_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            base_url: final_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Reads the body and fails on non-2xx statuses.
    async fn read_body(response: reqwest::Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        debug!("Tracker API response status: {}", status);

        if !status.is_success() {
            warn!("Tracker API error: {} - {}", status.as_u16(), body);
            return Err(error_from_status(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
        serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Self::read_body(response).await
    }
}

#[async_trait]
impl VisitStore for RemoteStore {
    fn name(&self) -> &str {
        "remote"
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let response = self
            .client
            .get(self.url("data"))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let body = Self::read_body(response).await?;
        let snapshot: Snapshot = Self::decode(&body)?;
        debug!(
            "Fetched snapshot: {} users, {} visits",
            snapshot.users.len(),
            snapshot.all_user_visits.len()
        );
        Ok(snapshot)
    }

    async fn add_country(&self, query: &str) -> Result<(), StoreError> {
        self.post("add", &CountryRequest { country: query }).await?;
        info!("Remote add country: {:?}", query);
        Ok(())
    }

    async fn delete_country(&self, query: &str) -> Result<(), StoreError> {
        self.post("delete-country", &CountryRequest { country: query })
            .await?;
        info!("Remote delete country: {:?}", query);
        Ok(())
    }

    async fn switch_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.post("switch-user", &UserRequest { user: user_id }).await?;
        info!("Remote switch user: {}", user_id);
        Ok(())
    }

    async fn add_user(&self, name: &str, color: Color) -> Result<UserId, StoreError> {
        let name = validate_user_name(name)?;
        let body = self.post("add-user", &NewUserRequest { name, color }).await?;
        let created: NewUserResponse = Self::decode(&body)?;
        info!("Remote created user {} ({})", created.user_id, color);
        Ok(created.user_id)
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), StoreError> {
        self.post("delete-user", &UserRequest { user: user_id }).await?;
        info!("Remote delete user: {}", user_id);
        Ok(())
    }
}
