//! Recipient directory for assignments and sign-off

use serde::{Deserialize, Serialize};

/// Person who can own, review or sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Directory id
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role, e.g. "data owner"
    #[serde(default)]
    pub role: String,
}

impl Recipient {
    /// Create recipient
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.email, &self.role]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// In-memory directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    recipients: Vec<Recipient>,
}

impl Directory {
    /// Directory over `recipients`
    #[must_use]
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self { recipients }
    }

    /// Case-insensitive substring search over name, email and role
    ///
    /// A blank query returns everyone.
    pub fn search(&self, query: &str) -> Vec<&Recipient> {
        let needle = query.trim().to_lowercase();
        self.recipients
            .iter()
            .filter(|r| needle.is_empty() || r.matches(&needle))
            .collect()
    }

    /// Lookup by id
    pub fn get(&self, id: &str) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.id == id)
    }

    /// Number of recipients
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// Whether empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(vec![
            Recipient::new("u1", "Ada Park", "ada.park@bank.example", "data owner"),
            Recipient::new("u2", "Sam Ortiz", "sam.ortiz@bank.example", "CFO"),
            Recipient::new("u3", "Lee Chen", "lee.chen@bank.example", "data steward"),
        ])
    }

    #[test]
    fn search_is_case_insensitive() {
        let dir = directory();
        let ids: Vec<&str> = dir.search("DATA").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);
        assert_eq!(dir.search("ortiz@")[0].id, "u2");
    }

    #[test]
    fn blank_query_returns_everyone() {
        assert_eq!(directory().search("   ").len(), 3);
    }

    #[test]
    fn get_by_id() {
        let dir = directory();
        assert_eq!(dir.get("u2").map(|r| r.name.as_str()), Some("Sam Ortiz"));
        assert!(dir.get("u9").is_none());
        assert_eq!(dir.len(), 3);
    }
}
