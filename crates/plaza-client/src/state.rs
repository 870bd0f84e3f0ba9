//! Application state shared across all command handlers.
//!
//! [`AppState`] is wrapped in `Arc<Mutex<>>` ([`SharedState`]) so that a
//! presentation layer can invoke commands from any thread.

use std::sync::{Arc, Mutex};

use plaza_store::Database;

use crate::config::ClientConfig;
use crate::session::SessionController;

pub type SharedState = Arc<Mutex<AppState>>;

/// Central application state.
///
/// Holds the configuration, the in-memory store and the session driving it.
pub struct AppState {
    pub config: ClientConfig,

    /// The "simulated database".  Lives as long as the process (or test);
    /// other sessions may hold clones of the same `Arc`.
    pub database: Arc<Database>,

    /// The session the presentation layer is rendering.
    pub session: SessionController,
}

impl AppState {
    /// A fresh store and a logged-out session built from `config`.
    pub fn new(config: ClientConfig) -> Self {
        let database = config.open_database();
        Self::with_database(config, database)
    }

    /// A logged-out session over an existing store.
    pub fn with_database(config: ClientConfig, database: Arc<Database>) -> Self {
        let session = config.new_session(database.clone());
        Self {
            config,
            database,
            session,
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use plaza_shared::AuthState;

    use super::*;

    #[test]
    fn states_over_one_database_share_data() {
        let first = AppState::default();
        let mut second = AppState::with_database(first.config.clone(), first.database.clone());

        first
            .database
            .users()
            .create("Ana", "ana@x.com", 20, None)
            .unwrap();
        second.session.login("ana@x.com").unwrap();

        assert_eq!(first.session.auth_state(), AuthState::LoggedOut);
        assert_eq!(second.session.auth_state(), AuthState::LoggedIn);
    }
}
