//! Client configuration loaded from environment variables.
//!
//! Every setting has a default, so the client runs with zero configuration.

use std::sync::Arc;

use plaza_shared::constants::DEFAULT_AVATAR_BASE_URL;
use plaza_store::{Database, EmailMatch};

use crate::session::SessionController;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Avatar service used for users who skip the profile photo.
    /// Env: `PLAZA_AVATAR_BASE_URL`
    /// Default: `https://i.pravatar.cc/150`
    pub avatar_base_url: String,

    /// How login matches emails (`exact` or `case_insensitive`).
    /// Env: `PLAZA_EMAIL_MATCH`
    /// Default: `exact`
    pub email_match: EmailMatch,

    /// Fail loudly instead of logging out when the logged-in user cannot be
    /// resolved.
    /// Env: `PLAZA_STRICT_SESSION` (true/false)
    /// Default: `false`
    pub strict_session: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
            email_match: EmailMatch::Exact,
            strict_session: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PLAZA_AVATAR_BASE_URL") {
            let url = url.trim();
            if url.is_empty() {
                tracing::warn!("Empty PLAZA_AVATAR_BASE_URL, using default");
            } else {
                config.avatar_base_url = url.to_string();
            }
        }

        if let Some(val) = lookup("PLAZA_EMAIL_MATCH") {
            match val.parse::<EmailMatch>() {
                Ok(policy) => config.email_match = policy,
                Err(e) => tracing::warn!(error = %e, "Invalid PLAZA_EMAIL_MATCH, using default"),
            }
        }

        if let Some(val) = lookup("PLAZA_STRICT_SESSION") {
            config.strict_session = val != "false" && val != "0";
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }

    /// A fresh, empty store configured from this config.
    pub fn open_database(&self) -> Arc<Database> {
        Arc::new(Database::with_options(
            self.email_match,
            self.avatar_base_url.clone(),
        ))
    }

    /// A logged-out session over `db` honouring this config.
    pub fn new_session(&self, db: Arc<Database>) -> SessionController {
        SessionController::new(db).with_strict(self.strict_session)
    }
}
