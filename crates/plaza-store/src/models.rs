//! Domain records held by the in-memory store.
//!
//! Every struct derives `Serialize` with camelCase field names so it can be
//! handed directly to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plaza_shared::{ConversationId, MessageId, PostId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user.  Created once profile setup completes; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Registry-unique identifier, assigned at creation.
    pub id: UserId,
    /// Display name chosen during profile setup.
    pub name: String,
    /// Natural key used for login lookup.
    pub email: String,
    /// Opaque image handle (URL or data URL).
    pub avatar: String,
    pub age: u32,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A published post.  Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    /// Author at creation time; always the session's current user.
    pub author_id: UserId,
    pub content: String,
    /// Optional opaque image handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single direct message.  Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A two-party conversation and its message log, oldest first.
///
/// `participant_ids` is always derived from `id`; there is no constructor
/// that accepts it separately.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: ConversationId,
    participant_ids: [UserId; 2],
    messages: Vec<Message>,
}

impl Conversation {
    /// An empty conversation for `id`.
    pub fn new(id: ConversationId) -> Self {
        let [low, high] = id.participants();
        let participant_ids = [low.clone(), high.clone()];
        Self {
            id,
            participant_ids,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Participants in canonical (ascending) order.
    pub fn participant_ids(&self) -> &[UserId; 2] {
        &self.participant_ids
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
