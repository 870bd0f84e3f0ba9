//! # plaza-store
//!
//! In-memory storage for the Plaza client: the user registry, the post
//! ledger and the conversation directory.
//!
//! Nothing is persisted.  Each collection sits behind its own mutex so a
//! single [`Database`] can be shared by several sessions through an `Arc`,
//! and every find-or-create runs inside one critical section.

pub mod database;
pub mod directory;
pub mod ledger;
pub mod models;
pub mod registry;

pub use database::Database;
pub use directory::ConversationDirectory;
pub use ledger::PostLedger;
pub use models::*;
pub use registry::{EmailMatch, UserRegistry};
