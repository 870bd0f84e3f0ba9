use thiserror::Error;

use crate::types::{AuthState, ConversationId, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlazaError {
    #[error("No user registered with email {email}")]
    UserNotFound { email: String },

    #[error("No authenticated user for this command")]
    InvalidSession,

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Email {email} is already registered")]
    EmailTaken { email: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed conversation id: {0}")]
    MalformedConversationId(String),

    #[error("User {user} is not a participant of conversation {conversation}")]
    NotAParticipant {
        user: UserId,
        conversation: ConversationId,
    },

    #[error("Cannot {command} while {state}")]
    InvalidTransition {
        command: &'static str,
        state: AuthState,
    },

    #[error("Session invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl PlazaError {
    /// Stable machine-readable code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound { .. } => "user_not_found",
            Self::InvalidSession => "invalid_session",
            Self::EmptyMessage => "empty_message",
            Self::EmailTaken { .. } => "email_taken",
            Self::InvalidInput(_) => "invalid_input",
            Self::MalformedConversationId(_) => "malformed_conversation_id",
            Self::NotAParticipant { .. } => "not_a_participant",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::LockPoisoned(_) => "lock_poisoned",
        }
    }

    /// Whether the user can fix the problem and retry (as opposed to a
    /// command that should never have been issued).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::EmptyMessage
                | Self::EmailTaken { .. }
                | Self::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlazaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_snake_case() {
        let errors = [
            PlazaError::UserNotFound {
                email: "a@x.com".into(),
            },
            PlazaError::InvalidSession,
            PlazaError::EmptyMessage,
            PlazaError::InvalidTransition {
                command: "login",
                state: AuthState::LoggedIn,
            },
        ];
        for err in errors {
            assert!(err.code().chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_recoverable_split() {
        assert!(PlazaError::EmptyMessage.is_recoverable());
        assert!(PlazaError::UserNotFound {
            email: "x".into()
        }
        .is_recoverable());
        assert!(!PlazaError::InvalidSession.is_recoverable());
        assert!(!PlazaError::InvariantViolation("x".into()).is_recoverable());
    }

    #[test]
    fn test_transition_message_names_state() {
        let err = PlazaError::InvalidTransition {
            command: "register",
            state: AuthState::ProfileSetup,
        };
        assert_eq!(err.to_string(), "Cannot register while profileSetup");
    }
}
