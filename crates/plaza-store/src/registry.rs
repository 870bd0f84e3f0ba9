//! The identity registry: every registered [`User`], in registration order.

use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use plaza_shared::constants::{AVATAR_SEED_BYTES, DEFAULT_AVATAR_BASE_URL};
use plaza_shared::{PlazaError, Result, UserId};

use crate::database::lock;
use crate::models::User;

/// How login compares the typed email with registered ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailMatch {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// Unicode lowercase comparison.
    CaseInsensitive,
}

impl EmailMatch {
    pub fn matches(self, registered: &str, candidate: &str) -> bool {
        match self {
            Self::Exact => registered == candidate,
            Self::CaseInsensitive => registered.to_lowercase() == candidate.to_lowercase(),
        }
    }
}

impl FromStr for EmailMatch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "case_insensitive" | "case-insensitive" => Ok(Self::CaseInsensitive),
            other => Err(format!("unknown email match policy: {other}")),
        }
    }
}

#[derive(Debug)]
pub struct UserRegistry {
    users: Mutex<Vec<User>>,
    email_match: EmailMatch,
    avatar_base_url: String,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new(EmailMatch::default(), DEFAULT_AVATAR_BASE_URL)
    }
}

impl UserRegistry {
    pub fn new(email_match: EmailMatch, avatar_base_url: impl Into<String>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            email_match,
            avatar_base_url: avatar_base_url.into(),
        }
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Register a new user.
    ///
    /// A blank or missing `avatar_url` gets a default avatar derived from the
    /// new id.  Fails with [`PlazaError::EmailTaken`] if the email is already
    /// registered under the active policy.
    pub fn create(
        &self,
        name: &str,
        email: &str,
        age: u32,
        avatar_url: Option<String>,
    ) -> Result<User> {
        let mut users = lock(&self.users, "users")?;

        if users.iter().any(|u| self.email_match.matches(&u.email, email)) {
            return Err(PlazaError::EmailTaken {
                email: email.to_string(),
            });
        }

        let mut id = UserId::generate();
        while users.iter().any(|u| u.id == id) {
            id = UserId::generate();
        }

        let avatar = avatar_url
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default_avatar(&self.avatar_base_url, &id));

        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            avatar,
            age,
        };
        users.push(user.clone());

        debug!(user = %user.id, total = users.len(), "user registered");
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = lock(&self.users, "users")?;
        Ok(users
            .iter()
            .find(|u| self.email_match.matches(&u.email, email))
            .cloned())
    }

    pub fn get(&self, id: &UserId) -> Result<Option<User>> {
        let users = lock(&self.users, "users")?;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    pub fn contains(&self, id: &UserId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// All users, in registration order.
    pub fn list(&self) -> Result<Vec<User>> {
        Ok(lock(&self.users, "users")?.clone())
    }

    /// Everyone except `excluding`.
    pub fn others(&self, excluding: &UserId) -> Result<Vec<User>> {
        let users = lock(&self.users, "users")?;
        Ok(users.iter().filter(|u| &u.id != excluding).cloned().collect())
    }

    /// Case-insensitive substring search over name and email.
    ///
    /// An empty (or all-whitespace) term matches every user.
    pub fn search(&self, term: &str, excluding: Option<&UserId>) -> Result<Vec<User>> {
        let needle = term.trim().to_lowercase();
        let users = lock(&self.users, "users")?;
        Ok(users
            .iter()
            .filter(|u| Some(&u.id) != excluding)
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.users, "users")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Deterministic avatar URL for a user who skipped the photo.
pub fn default_avatar(base_url: &str, id: &UserId) -> String {
    let hash = blake3::hash(id.as_str().as_bytes());
    let seed = hex::encode(&hash.as_bytes()[..AVATAR_SEED_BYTES]);
    format!("{}?u={seed}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids_and_avatar() {
        let registry = UserRegistry::default();
        let a = registry.create("Alice", "alice@x.com", 30, None).unwrap();
        let b = registry.create("Bob", "bob@x.com", 25, None).unwrap();

        assert_ne!(a.id, b.id);
        assert!(a.avatar.starts_with(DEFAULT_AVATAR_BASE_URL));
        assert_eq!(a.avatar, default_avatar(DEFAULT_AVATAR_BASE_URL, &a.id));
        assert_eq!(registry.list().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_supplied_avatar_is_kept() {
        let registry = UserRegistry::default();
        let user = registry
            .create("Cy", "cy@x.com", 40, Some("data:image/png;base64,AAAA".into()))
            .unwrap();
        assert_eq!(user.avatar, "data:image/png;base64,AAAA");

        let blank = registry
            .create("Di", "di@x.com", 41, Some("   ".into()))
            .unwrap();
        assert!(blank.avatar.starts_with(DEFAULT_AVATAR_BASE_URL));
    }

    #[test]
    fn test_default_avatar_is_deterministic() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(default_avatar("https://a/", &id), default_avatar("https://a", &id));
        let other = UserId::new("u2").unwrap();
        assert_ne!(default_avatar("https://a", &id), default_avatar("https://a", &other));
    }

    #[test]
    fn test_find_by_email_exact() {
        let registry = UserRegistry::default();
        registry.create("Alice", "alice@x.com", 30, None).unwrap();

        assert!(registry.find_by_email("alice@x.com").unwrap().is_some());
        assert!(registry.find_by_email("Alice@X.com").unwrap().is_none());
        assert!(registry.find_by_email("missing@x.com").unwrap().is_none());
    }

    #[test]
    fn test_find_by_email_case_insensitive() {
        let registry = UserRegistry::new(EmailMatch::CaseInsensitive, DEFAULT_AVATAR_BASE_URL);
        let alice = registry.create("Alice", "alice@x.com", 30, None).unwrap();
        assert_eq!(registry.find_by_email("ALICE@x.COM").unwrap(), Some(alice));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let registry = UserRegistry::new(EmailMatch::CaseInsensitive, DEFAULT_AVATAR_BASE_URL);
        registry.create("Alice", "alice@x.com", 30, None).unwrap();
        let err = registry
            .create("Other", "ALICE@x.com", 31, None)
            .unwrap_err();
        assert_eq!(
            err,
            PlazaError::EmailTaken {
                email: "ALICE@x.com".into()
            }
        );
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_search_and_others() {
        let registry = UserRegistry::default();
        let alice = registry.create("Alice", "alice@x.com", 30, None).unwrap();
        let bob = registry.create("Bob Stone", "bob@y.org", 25, None).unwrap();
        let carol = registry.create("Carol", "carol@x.com", 28, None).unwrap();

        let hits = registry.search("X.COM", Some(&alice.id)).unwrap();
        assert_eq!(hits, vec![carol.clone()]);

        let hits = registry.search("stone", None).unwrap();
        assert_eq!(hits, vec![bob.clone()]);

        assert_eq!(registry.search("  ", Some(&alice.id)).unwrap().len(), 2);
        assert_eq!(registry.others(&bob.id).unwrap(), vec![alice, carol]);
    }

    #[test]
    fn test_get_and_contains() {
        let registry = UserRegistry::default();
        let alice = registry.create("Alice", "alice@x.com", 30, None).unwrap();
        assert_eq!(registry.get(&alice.id).unwrap(), Some(alice.clone()));
        assert!(registry.contains(&alice.id).unwrap());
        assert!(!registry.contains(&UserId::new("ghost").unwrap()).unwrap());
    }

    #[test]
    fn test_email_match_parse() {
        assert_eq!("exact".parse::<EmailMatch>(), Ok(EmailMatch::Exact));
        assert_eq!(
            " Case_Insensitive ".parse::<EmailMatch>(),
            Ok(EmailMatch::CaseInsensitive)
        );
        assert!("fuzzy".parse::<EmailMatch>().is_err());
    }
}
