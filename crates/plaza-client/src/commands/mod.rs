//! Command handlers for the presentation layer.
//!
//! Each sub-module groups related commands by domain.  Every handler takes a
//! [`SharedState`], locks it for the duration of the call and returns a
//! serializable value or a [`CommandError`].

pub mod auth;
pub mod messaging;
pub mod posts;
pub mod users;

use std::sync::MutexGuard;

use serde::Serialize;
use thiserror::Error;

use plaza_shared::{PlazaError, UserId};

use crate::state::{AppState, SharedState};

/// Error returned to the presentation layer.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct CommandError {
    /// Stable snake_case code, see [`PlazaError::code`].
    pub code: String,
    pub message: String,
    /// Whether the user can correct the input and retry.
    pub recoverable: bool,
}

impl From<PlazaError> for CommandError {
    fn from(e: PlazaError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
            recoverable: e.is_recoverable(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

fn lock(state: &SharedState) -> CommandResult<MutexGuard<'_, AppState>> {
    state
        .lock()
        .map_err(|e| PlazaError::LockPoisoned(format!("app state: {e}")).into())
}

fn parse_user_id(raw: &str) -> CommandResult<UserId> {
    Ok(raw.trim().parse::<UserId>()?)
}
