use serde::Serialize;

use plaza_shared::AuthState;
use plaza_store::User;

use super::{lock, CommandResult};
use crate::session::{PendingRegistration, SessionController};
use crate::state::SharedState;

/// What the presentation layer needs to pick a screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub auth_state: AuthState,
    pub current_user: Option<User>,
    pub pending_registration: Option<PendingRegistration>,
}

impl SessionDto {
    fn snapshot(session: &SessionController) -> CommandResult<Self> {
        Ok(Self {
            auth_state: session.auth_state(),
            current_user: session.current_user()?,
            pending_registration: session.pending_registration().cloned(),
        })
    }
}

/// Current session, after the consistency check that runs before each render.
pub fn get_session(state: &SharedState) -> CommandResult<SessionDto> {
    let mut guard = lock(state)?;
    guard.session.check_session()?;
    SessionDto::snapshot(&guard.session)
}

pub fn login(state: &SharedState, email: String) -> CommandResult<SessionDto> {
    let mut guard = lock(state)?;
    guard.session.login(&email)?;
    SessionDto::snapshot(&guard.session)
}

pub fn register(
    state: &SharedState,
    name: String,
    email: String,
    age: u32,
) -> CommandResult<SessionDto> {
    let mut guard = lock(state)?;
    guard.session.register(&name, &email, age)?;
    SessionDto::snapshot(&guard.session)
}

pub fn complete_profile_setup(
    state: &SharedState,
    name: String,
    avatar_url: Option<String>,
) -> CommandResult<SessionDto> {
    let mut guard = lock(state)?;
    guard.session.complete_profile_setup(&name, avatar_url)?;
    SessionDto::snapshot(&guard.session)
}

pub fn logout(state: &SharedState) -> CommandResult<SessionDto> {
    let mut guard = lock(state)?;
    guard.session.logout();
    SessionDto::snapshot(&guard.session)
}
