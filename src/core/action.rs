//! # Actions
//!
//! Every user intent becomes an `Action`.
//! Typing a country and pressing Add? That's `Action::AddCountry(text)`.
//! Clicking a family member's tab? That's `Action::SwitchUser(id)`.
//!
//! `App::dispatch` sends the action to the store, then re-fetches the
//! snapshot so the next render reflects the write.
//!
//! ```text
//! Action  →  VisitStore  →  snapshot()  →  stats::compute()  →  render
//! ```

use std::fmt;

use crate::store::types::{Color, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-read the snapshot without changing anything.
    Refresh,
    AddCountry(String),
    DeleteCountry(String),
    SwitchUser(UserId),
    AddUser { name: String, color: Color },
    DeleteUser(UserId),
}

impl Action {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Refresh)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Refresh => write!(f, "refresh"),
            Action::AddCountry(q) => write!(f, "add country {q:?}"),
            Action::DeleteCountry(q) => write!(f, "delete country {q:?}"),
            Action::SwitchUser(id) => write!(f, "switch to user {id}"),
            Action::AddUser { name, color } => write!(f, "add user {name:?} ({color})"),
            Action::DeleteUser(id) => write!(f, "delete user {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_refresh_is_read_only() {
        assert!(!Action::Refresh.is_mutation());
        assert!(Action::AddCountry("Peru".into()).is_mutation());
        assert!(Action::DeleteUser(UserId(1)).is_mutation());
    }

    #[test]
    fn test_display() {
        let action = Action::AddUser {
            name: "Jack".into(),
            color: Color::Orange,
        };
        assert_eq!(action.to_string(), "add user \"Jack\" (orange)");
        assert_eq!(Action::SwitchUser(UserId(3)).to_string(), "switch to user 3");
    }
}
