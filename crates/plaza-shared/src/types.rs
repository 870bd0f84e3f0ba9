use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::CONVERSATION_ID_SEPARATOR;
use crate::error::PlazaError;

// User identity = opaque string that never contains the conversation separator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, PlazaError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PlazaError::InvalidInput("user id is empty".into()));
        }
        if id.contains(CONVERSATION_ID_SEPARATOR) {
            return Err(PlazaError::InvalidInput(format!(
                "user id {id:?} contains '{CONVERSATION_ID_SEPARATOR}'"
            )));
        }
        Ok(Self(id))
    }

    /// Fresh registry-unique id (simple-form v4 UUID).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = PlazaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = PlazaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a two-party conversation.
///
/// The pair is stored sorted, so `canonical(a, b) == canonical(b, a)` and the
/// rendered form `"{low}_{high}"` is the same whoever starts the conversation.
/// There is no way to build one with the participants out of order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId {
    low: UserId,
    high: UserId,
}

impl ConversationId {
    pub fn canonical(a: &UserId, b: &UserId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low: low.clone(),
            high: high.clone(),
        }
    }

    /// Both participants, in canonical (ascending) order.
    pub fn participants(&self) -> [&UserId; 2] {
        [&self.low, &self.high]
    }

    pub fn contains(&self, user: &UserId) -> bool {
        &self.low == user || &self.high == user
    }

    /// The other participant, or `None` if `user` is not part of this
    /// conversation.
    pub fn counterpart(&self, user: &UserId) -> Option<&UserId> {
        if &self.low == user {
            Some(&self.high)
        } else if &self.high == user {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.low, CONVERSATION_ID_SEPARATOR, self.high)
    }
}

impl FromStr for ConversationId {
    type Err = PlazaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PlazaError::MalformedConversationId(s.to_string());
        let (a, b) = s.split_once(CONVERSATION_ID_SEPARATOR).ok_or_else(malformed)?;
        let a = UserId::new(a).map_err(|_| malformed())?;
        let b = UserId::new(b).map_err(|_| malformed())?;
        Ok(Self::canonical(&a, &b))
    }
}

impl TryFrom<String> for ConversationId {
    type Error = PlazaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.to_string()
    }
}

/// Authentication phase of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum AuthState {
    #[default]
    LoggedOut,
    ProfileSetup,
    LoggedIn,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoggedOut => "loggedOut",
            Self::ProfileSetup => "profileSetup",
            Self::LoggedIn => "loggedIn",
        })
    }
}
