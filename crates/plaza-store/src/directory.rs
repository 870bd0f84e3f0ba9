//! The conversation directory.
//!
//! Conversations are keyed by their canonical [`ConversationId`], so finding
//! "the conversation between A and B" is a direct map lookup whichever of the
//! two asks.  Records are created lazily on first message and never replaced:
//! all creation goes through [`Conversations::get_or_insert`] while the
//! directory lock is held, so concurrent callers for the same pair observe the
//! first caller's record.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use plaza_shared::{ConversationId, MessageId, PlazaError, Result, UserId};

use crate::database::lock;
use crate::models::{Conversation, Message};

#[derive(Debug, Default)]
struct Conversations {
    by_id: HashMap<ConversationId, Conversation>,
    // creation order
    order: Vec<ConversationId>,
}

impl Conversations {
    fn get_or_insert(&mut self, id: &ConversationId) -> &mut Conversation {
        if !self.by_id.contains_key(id) {
            debug!(conversation = %id, "conversation created");
            self.order.push(id.clone());
        }
        self.by_id
            .entry(id.clone())
            .or_insert_with(|| Conversation::new(id.clone()))
    }

    fn in_order(&self) -> impl Iterator<Item = &Conversation> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

#[derive(Debug, Default)]
pub struct ConversationDirectory {
    inner: Mutex<Conversations>,
}

impl ConversationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The order-independent id for the pair `a`, `b`.
    pub fn canonical_id(a: &UserId, b: &UserId) -> ConversationId {
        ConversationId::canonical(a, b)
    }

    /// Look up the conversation between `a` and `b`, creating an empty one
    /// if none exists yet.
    pub fn get_or_create(&self, a: &UserId, b: &UserId) -> Result<Conversation> {
        let id = Self::canonical_id(a, b);
        let mut inner = lock(&self.inner, "conversations")?;
        Ok(inner.get_or_insert(&id).clone())
    }

    /// Append `text` from `sender` to the conversation `id`, creating the
    /// conversation first if needed.
    ///
    /// `sender` is the session's current user.  The whole find-or-create-then-
    /// append happens under one lock; on error nothing is created.
    pub fn append_message(
        &self,
        id: &ConversationId,
        sender: Option<&UserId>,
        text: &str,
    ) -> Result<Message> {
        let sender = sender.ok_or(PlazaError::InvalidSession)?;
        if text.trim().is_empty() {
            return Err(PlazaError::EmptyMessage);
        }
        if !id.contains(sender) {
            return Err(PlazaError::NotAParticipant {
                user: sender.clone(),
                conversation: id.clone(),
            });
        }

        let message = Message {
            id: MessageId::new(),
            sender_id: sender.clone(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        let mut inner = lock(&self.inner, "conversations")?;
        let conversation = inner.get_or_insert(id);
        conversation.push(message.clone());

        debug!(
            conversation = %id,
            message = %message.id,
            count = conversation.messages().len(),
            "message appended"
        );
        Ok(message)
    }

    /// Look up without creating.
    pub fn get(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        Ok(lock(&self.inner, "conversations")?.by_id.get(id).cloned())
    }

    /// All conversations, in creation order.
    pub fn list(&self) -> Result<Vec<Conversation>> {
        let inner = lock(&self.inner, "conversations")?;
        Ok(inner.in_order().cloned().collect())
    }

    /// Conversations that include `user`, in creation order.
    pub fn list_for_user(&self, user: &UserId) -> Result<Vec<Conversation>> {
        let inner = lock(&self.inner, "conversations")?;
        Ok(inner
            .in_order()
            .filter(|c| c.id().contains(user))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.inner, "conversations")?.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let dir = ConversationDirectory::new();
        let (a, b) = (uid("u1"), uid("u2"));

        let first = dir.get_or_create(&a, &b).unwrap();
        let second = dir.get_or_create(&b, &a).unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(first.participant_ids(), &[a, b]);
        assert_eq!(dir.len().unwrap(), 1);
    }

    #[test]
    fn test_both_directions_share_one_conversation() {
        let dir = ConversationDirectory::new();
        let (u1, u2) = (uid("u1"), uid("u2"));

        dir.append_message(&ConversationDirectory::canonical_id(&u1, &u2), Some(&u1), "hi")
            .unwrap();
        dir.append_message(&ConversationDirectory::canonical_id(&u2, &u1), Some(&u2), "hey")
            .unwrap();

        let all = dir.list().unwrap();
        assert_eq!(all.len(), 1);
        let texts: Vec<_> = all[0].messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hey"]);
        assert_eq!(all[0].messages()[1].sender_id, u2);
    }

    #[test]
    fn test_append_rejections_leave_directory_untouched() {
        let dir = ConversationDirectory::new();
        let (u1, u2, u3) = (uid("u1"), uid("u2"), uid("u3"));
        let id = ConversationDirectory::canonical_id(&u1, &u2);

        assert_eq!(
            dir.append_message(&id, None, "hi"),
            Err(PlazaError::InvalidSession)
        );
        assert_eq!(
            dir.append_message(&id, Some(&u1), " \n\t"),
            Err(PlazaError::EmptyMessage)
        );
        assert_eq!(
            dir.append_message(&id, Some(&u1), ""),
            Err(PlazaError::EmptyMessage)
        );
        assert!(matches!(
            dir.append_message(&id, Some(&u3), "intruder"),
            Err(PlazaError::NotAParticipant { .. })
        ));
        assert!(dir.is_empty().unwrap());
        assert!(dir.get(&id).unwrap().is_none());
    }

    #[test]
    fn test_one_message_per_call_in_order() {
        let dir = ConversationDirectory::new();
        let (u1, u2) = (uid("u1"), uid("u2"));
        let id = ConversationDirectory::canonical_id(&u1, &u2);

        for i in 0..10 {
            let sender = if i % 2 == 0 { &u1 } else { &u2 };
            dir.append_message(&id, Some(sender), &format!("m{i}")).unwrap();
            assert_eq!(dir.get(&id).unwrap().unwrap().messages().len(), i + 1);
        }
        let conv = dir.get(&id).unwrap().unwrap();
        assert_eq!(conv.last_message().map(|m| m.text.as_str()), Some("m9"));
    }

    #[test]
    fn test_list_for_user_in_creation_order() {
        let dir = ConversationDirectory::new();
        let (a, b, c) = (uid("a"), uid("b"), uid("c"));
        dir.get_or_create(&c, &a).unwrap();
        dir.get_or_create(&b, &c).unwrap();
        dir.get_or_create(&a, &b).unwrap();

        let ids: Vec<String> = dir
            .list_for_user(&a)
            .unwrap()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a_c", "a_b"]);
        assert_eq!(dir.list().unwrap().len(), 3);
    }

    #[test]
    fn test_concurrent_get_or_create_single_record() {
        let dir = Arc::new(ConversationDirectory::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    let (a, b) = (uid("left"), uid("right"));
                    let id = ConversationDirectory::canonical_id(&a, &b);
                    let sender = if i % 2 == 0 { a } else { b };
                    dir.append_message(&id, Some(&sender), &format!("t{i}")).unwrap();
                    dir.get_or_create(&sender, &uid(if i % 2 == 0 { "right" } else { "left" }))
                        .unwrap()
                        .id()
                        .clone()
                })
            })
            .collect();

        let ids: Vec<ConversationId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(dir.len().unwrap(), 1);
        assert_eq!(dir.list().unwrap()[0].messages().len(), 8);
    }
}
