//! # plaza-shared
//!
//! Identifier types, session phases, and the error taxonomy shared by the
//! store and client crates.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{PlazaError, Result};
pub use types::{AuthState, ConversationId, MessageId, PostId, UserId};
