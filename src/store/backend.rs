use std::fmt;

use async_trait::async_trait;

use super::types::{Color, Snapshot, UserId};

/// Errors that can occur during store operations.
/// Both backends map their failures onto the same variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Country name unresolved, visit record absent, or user absent.
    NotFound(String),
    /// The (country, user) visit already exists.
    Conflict(String),
    /// Input rejected before touching state (e.g. empty user name).
    Validation(String),
    /// Transport-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Remote returned a status we don't map to a domain error.
    Api { status: u16, message: String },
    /// Local persistence failed (I/O, corrupt document).
    Storage(String),
    /// Response body could not be decoded.
    Parse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            StoreError::Conflict(msg) => write!(f, "conflict: {msg}"),
            StoreError::Validation(msg) => write!(f, "invalid input: {msg}"),
            StoreError::Network(msg) => write!(f, "network error: {msg}"),
            StoreError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            StoreError::Storage(msg) => write!(f, "storage error: {msg}"),
            StoreError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Message suitable for an inline notice, without the category prefix.
    pub fn user_message(&self) -> &str {
        match self {
            StoreError::NotFound(msg)
            | StoreError::Conflict(msg)
            | StoreError::Validation(msg)
            | StoreError::Network(msg)
            | StoreError::Storage(msg)
            | StoreError::Parse(msg) => msg,
            StoreError::Api { message, .. } => message,
        }
    }
}

/// Trims a user name and rejects it if nothing is left.
///
/// Shared by both backends so an empty name never reaches a server.
pub fn validate_user_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("user name must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// Owns users, visit records and the current-user pointer.
///
/// Every mutation is atomic: it either fully applies and is visible to the
/// next `snapshot()`, or fails and leaves state unchanged.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Reads the current aggregate state.
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Resolves `query` to a country and records a visit for the current user.
    async fn add_country(&self, query: &str) -> Result<(), StoreError>;

    /// Resolves `query` to a country and removes the current user's visit.
    async fn delete_country(&self, query: &str) -> Result<(), StoreError>;

    /// Points the store at another user.
    async fn switch_user(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Creates a user and makes it current.
    async fn add_user(&self, name: &str, color: Color) -> Result<UserId, StoreError>;

    /// Deletes a user and all of their visits.
    async fn delete_user(&self, user_id: UserId) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_name_trims() {
        assert_eq!(validate_user_name("  Jack ").unwrap(), "Jack");
    }

    #[test]
    fn test_validate_user_name_rejects_blank() {
        assert!(matches!(validate_user_name("   "), Err(StoreError::Validation(_))));
        assert!(matches!(validate_user_name(""), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_display_and_user_message() {
        let err = StoreError::Api {
            status: 500,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): Server error");
        assert_eq!(err.user_message(), "Server error");

        let err = StoreError::Conflict("Country already added".to_string());
        assert_eq!(err.to_string(), "conflict: Country already added");
    }
}
