//! The store aggregate.
//!
//! [`Database`] owns the three collections.  It is built once per process
//! (or per test) and shared with sessions through an `Arc`; dropping the
//! last handle discards everything.

use std::sync::{Mutex, MutexGuard};

use plaza_shared::{PlazaError, Result};

use crate::directory::ConversationDirectory;
use crate::ledger::PostLedger;
use crate::registry::{EmailMatch, UserRegistry};

/// In-memory "simulated database".
#[derive(Debug, Default)]
pub struct Database {
    users: UserRegistry,
    posts: PostLedger,
    conversations: ConversationDirectory,
}

impl Database {
    /// Empty store with exact email matching and the default avatar service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with an explicit email policy and avatar base URL.
    pub fn with_options(email_match: EmailMatch, avatar_base_url: impl Into<String>) -> Self {
        Self {
            users: UserRegistry::new(email_match, avatar_base_url),
            posts: PostLedger::new(),
            conversations: ConversationDirectory::new(),
        }
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    pub fn posts(&self) -> &PostLedger {
        &self.posts
    }

    pub fn conversations(&self) -> &ConversationDirectory {
        &self.conversations
    }
}

/// Lock one collection, turning poisoning into an error instead of a panic.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| PlazaError::LockPoisoned(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_database_is_empty() {
        let db = Database::new();
        assert_eq!(db.users().len().unwrap(), 0);
        assert_eq!(db.posts().len().unwrap(), 0);
        assert_eq!(db.conversations().len().unwrap(), 0);
    }

    #[test]
    fn options_reach_the_registry() {
        let db = Database::with_options(EmailMatch::CaseInsensitive, "https://avatars.test/x");
        let user = db.users().create("Ana", "Ana@X.com", 22, None).unwrap();
        assert!(user.avatar.starts_with("https://avatars.test/x?u="));
        assert!(db.users().find_by_email("ana@x.com").unwrap().is_some());
    }

    #[test]
    fn poisoned_lock_is_an_error() {
        let mutex = std::sync::Arc::new(Mutex::new(0u8));
        let m = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = m.lock().unwrap();
            panic!("poison");
        })
        .join();
        let err = lock(&mutex, "counter").unwrap_err();
        assert_eq!(err.code(), "lock_poisoned");
    }
}
