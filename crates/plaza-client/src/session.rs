//! The session controller.
//!
//! [`SessionController`] is the only entry point for commands.  It tracks the
//! authentication phase, holds the current user's id, checks preconditions
//! and hands mutations to the store that owns the data.
//!
//! ```text
//!   loggedOut --register--> profileSetup --completeProfileSetup--> loggedIn
//!       ^   \___________________login___________________________/    |
//!       |_________________________logout_________________________________|
//! ```
//!
//! The pending registration and the current user live inside the phase
//! variant, so "profile setup without a pending registration" cannot be
//! expressed.  The one remaining inconsistency, a logged-in id that the
//! registry cannot resolve, is caught by [`SessionController::check_session`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use plaza_shared::{AuthState, ConversationId, PlazaError, Result, UserId};
use plaza_store::{Conversation, Database, Message, Post, User};

/// Registration details stashed between `register` and profile setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub name: String,
    pub email: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    LoggedOut,
    ProfileSetup(PendingRegistration),
    LoggedIn(UserId),
}

pub struct SessionController {
    db: Arc<Database>,
    phase: Phase,
    /// Treat an unresolvable current user as a hard error instead of
    /// resetting to `loggedOut`.
    strict: bool,
}

impl SessionController {
    /// A logged-out session over `db`.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            phase: Phase::LoggedOut,
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    // ------------------------------------------------------------------
    // Session queries
    // ------------------------------------------------------------------

    pub fn auth_state(&self) -> AuthState {
        match self.phase {
            Phase::LoggedOut => AuthState::LoggedOut,
            Phase::ProfileSetup(_) => AuthState::ProfileSetup,
            Phase::LoggedIn(_) => AuthState::LoggedIn,
        }
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        match &self.phase {
            Phase::LoggedIn(id) => Some(id),
            _ => None,
        }
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        match self.current_user_id() {
            Some(id) => self.db.users().get(id),
            None => Ok(None),
        }
    }

    pub fn pending_registration(&self) -> Option<&PendingRegistration> {
        match &self.phase {
            Phase::ProfileSetup(pending) => Some(pending),
            _ => None,
        }
    }

    /// Verify the session before rendering it.
    ///
    /// A logged-in session whose user cannot be resolved is a bug.  It is
    /// logged at `error` level and the session falls back to `loggedOut`, or,
    /// in strict mode, [`PlazaError::InvariantViolation`] is returned and the
    /// state is left as is.
    pub fn check_session(&mut self) -> Result<AuthState> {
        let Phase::LoggedIn(id) = &self.phase else {
            return Ok(self.auth_state());
        };
        if self.db.users().contains(id)? {
            return Ok(AuthState::LoggedIn);
        }

        if self.strict {
            error!(user = %id, "session invariant violated (strict mode, not resetting)");
            return Err(PlazaError::InvariantViolation(format!(
                "logged in as {id}, but no such user is registered"
            )));
        }
        error!(user = %id, "session invariant violated, resetting to loggedOut");
        self.phase = Phase::LoggedOut;
        Ok(AuthState::LoggedOut)
    }

    // ------------------------------------------------------------------
    // Authentication commands
    // ------------------------------------------------------------------

    /// Log in by email.  No credential is checked.
    pub fn login(&mut self, email: &str) -> Result<User> {
        self.expect_phase("login", AuthState::LoggedOut)?;
        let email = email.trim();

        let Some(user) = self.db.users().find_by_email(email)? else {
            warn!(email, "login failed: no such user");
            return Err(PlazaError::UserNotFound {
                email: email.to_string(),
            });
        };

        info!(user = %user.id, "logged in");
        self.phase = Phase::LoggedIn(user.id.clone());
        Ok(user)
    }

    /// Start a registration; the account is created by
    /// [`complete_profile_setup`](Self::complete_profile_setup).
    pub fn register(&mut self, name: &str, email: &str, age: u32) -> Result<()> {
        self.expect_phase("register", AuthState::LoggedOut)?;
        let name = name.trim();
        let email = email.trim();

        if email.is_empty() {
            return Err(PlazaError::InvalidInput("email is required".into()));
        }
        if name.is_empty() {
            return Err(PlazaError::InvalidInput("name is required".into()));
        }
        if self.db.users().find_by_email(email)?.is_some() {
            warn!(email, "registration rejected: email already registered");
            return Err(PlazaError::EmailTaken {
                email: email.to_string(),
            });
        }

        info!(email, "registration started, awaiting profile setup");
        self.phase = Phase::ProfileSetup(PendingRegistration {
            name: name.to_string(),
            email: email.to_string(),
            age,
        });
        Ok(())
    }

    /// Finish profile setup: create the user from the pending registration
    /// with the chosen display name and optional avatar, and log them in.
    pub fn complete_profile_setup(
        &mut self,
        name: &str,
        avatar_url: Option<String>,
    ) -> Result<User> {
        let Phase::ProfileSetup(pending) = &self.phase else {
            return Err(PlazaError::InvalidTransition {
                command: "complete profile setup",
                state: self.auth_state(),
            });
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(PlazaError::InvalidInput("name is required".into()));
        }

        let user = self
            .db
            .users()
            .create(name, &pending.email, pending.age, avatar_url)?;

        info!(user = %user.id, "profile setup complete, logged in");
        self.phase = Phase::LoggedIn(user.id.clone());
        Ok(user)
    }

    /// Drop the current user or pending registration.  The store keeps
    /// everything.
    pub fn logout(&mut self) {
        if self.phase == Phase::LoggedOut {
            return;
        }
        info!(from = %self.auth_state(), "logged out");
        self.phase = Phase::LoggedOut;
    }

    // ------------------------------------------------------------------
    // Store commands
    // ------------------------------------------------------------------

    pub fn add_post(&self, content: &str, image: Option<String>) -> Result<Post> {
        let post = self
            .db
            .posts()
            .add_post(self.current_user_id(), content, image)?;
        info!(post = %post.id, "post published");
        Ok(post)
    }

    /// Send `text` into `conversation_id` as the current user, creating the
    /// conversation on first use.
    pub fn send_message(&self, conversation_id: &ConversationId, text: &str) -> Result<Message> {
        let sender = self.current_user_id().ok_or(PlazaError::InvalidSession)?;
        if text.trim().is_empty() {
            return Err(PlazaError::EmptyMessage);
        }
        if let Some(recipient) = conversation_id.counterpart(sender) {
            self.check_recipient(sender, recipient)?;
        }

        let message = self
            .db
            .conversations()
            .append_message(conversation_id, Some(sender), text)?;
        info!(conversation = %conversation_id, message = %message.id, "message sent");
        Ok(message)
    }

    /// Send `text` to `recipient`, resolving the canonical conversation id.
    pub fn send_direct_message(&self, recipient: &UserId, text: &str) -> Result<Message> {
        let sender = self.current_user_id().ok_or(PlazaError::InvalidSession)?;
        let id = ConversationId::canonical(sender, recipient);
        self.send_message(&id, text)
    }

    /// The conversation with `counterpart`: the stored one, or an unsaved
    /// empty placeholder.  Never creates a record.
    pub fn conversation_with(&self, counterpart: &UserId) -> Result<Conversation> {
        let me = self.current_user_id().ok_or(PlazaError::InvalidSession)?;
        let id = ConversationId::canonical(me, counterpart);
        Ok(self
            .db
            .conversations()
            .get(&id)?
            .unwrap_or_else(|| Conversation::new(id)))
    }

    // ------------------------------------------------------------------
    // Store queries
    // ------------------------------------------------------------------

    pub fn users(&self) -> Result<Vec<User>> {
        self.db.users().list()
    }

    pub fn user_by_id(&self, id: &UserId) -> Result<Option<User>> {
        self.db.users().get(id)
    }

    /// Users other than the current one matching `term` by name or email.
    pub fn search_users(&self, term: &str) -> Result<Vec<User>> {
        self.db.users().search(term, self.current_user_id())
    }

    /// Everyone the current user could message.
    pub fn other_users(&self) -> Result<Vec<User>> {
        let me = self.current_user_id().ok_or(PlazaError::InvalidSession)?;
        self.db.users().others(me)
    }

    /// All posts, newest first.
    pub fn posts(&self) -> Result<Vec<Post>> {
        self.db.posts().list()
    }

    /// Posts by `author`, newest first.
    pub fn posts_by(&self, author: &UserId) -> Result<Vec<Post>> {
        self.db.posts().list_by_author(author)
    }

    /// Posts with their authors, newest first; unresolvable authors skipped.
    pub fn feed(&self) -> Result<Vec<(Post, User)>> {
        self.db.posts().feed(self.db.users())
    }

    pub fn conversations(&self) -> Result<Vec<Conversation>> {
        self.db.conversations().list()
    }

    pub fn my_conversations(&self) -> Result<Vec<Conversation>> {
        let me = self.current_user_id().ok_or(PlazaError::InvalidSession)?;
        self.db.conversations().list_for_user(me)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn expect_phase(&self, command: &'static str, expected: AuthState) -> Result<()> {
        let state = self.auth_state();
        if state != expected {
            warn!(command, %state, "command rejected in current state");
            return Err(PlazaError::InvalidTransition { command, state });
        }
        Ok(())
    }

    fn check_recipient(&self, sender: &UserId, recipient: &UserId) -> Result<()> {
        if sender == recipient {
            return Err(PlazaError::InvalidInput(
                "cannot send a message to yourself".into(),
            ));
        }
        if !self.db.users().contains(recipient)? {
            return Err(PlazaError::InvalidInput(format!(
                "unknown recipient {recipient}"
            )));
        }
        Ok(())
    }
}
