use serde::Serialize;

use plaza_shared::ConversationId;
use plaza_store::{Conversation, Message, User};

use super::{lock, parse_user_id, CommandResult};
use crate::state::SharedState;

/// One row of the conversation list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryDto {
    pub id: ConversationId,
    /// `None` if the other participant is not registered.
    pub counterpart: Option<User>,
    pub last_message: Option<Message>,
    pub message_count: usize,
}

/// Send into a conversation named by its canonical id (`"{low}_{high}"`).
pub fn send_message(
    state: &SharedState,
    conversation_id: String,
    text: String,
) -> CommandResult<Message> {
    let conversation_id: ConversationId = conversation_id.trim().parse()?;
    let guard = lock(state)?;
    Ok(guard.session.send_message(&conversation_id, &text)?)
}

/// Send to a user by id; the conversation id is derived.
pub fn send_direct_message(
    state: &SharedState,
    recipient_id: String,
    text: String,
) -> CommandResult<Message> {
    let recipient = parse_user_id(&recipient_id)?;
    let guard = lock(state)?;
    Ok(guard.session.send_direct_message(&recipient, &text)?)
}

/// Every conversation in the store, in creation order.
pub fn list_conversations(state: &SharedState) -> CommandResult<Vec<Conversation>> {
    let guard = lock(state)?;
    Ok(guard.session.conversations()?)
}

/// Conversations the current user takes part in.
pub fn my_conversations(state: &SharedState) -> CommandResult<Vec<Conversation>> {
    let guard = lock(state)?;
    Ok(guard.session.my_conversations()?)
}

/// The current user's conversations with the other party and latest message.
pub fn conversation_summaries(state: &SharedState) -> CommandResult<Vec<ConversationSummaryDto>> {
    let guard = lock(state)?;
    let session = &guard.session;
    let conversations = session.my_conversations()?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let counterpart = match session
            .current_user_id()
            .and_then(|me| conversation.id().counterpart(me))
        {
            Some(other) => session.user_by_id(other)?,
            None => None,
        };
        summaries.push(ConversationSummaryDto {
            id: conversation.id().clone(),
            counterpart,
            last_message: conversation.last_message().cloned(),
            message_count: conversation.messages().len(),
        });
    }
    Ok(summaries)
}

/// The chat window for `user_id`; empty if nothing was sent yet.
pub fn get_conversation_with(state: &SharedState, user_id: String) -> CommandResult<Conversation> {
    let counterpart = parse_user_id(&user_id)?;
    let guard = lock(state)?;
    Ok(guard.session.conversation_with(&counterpart)?)
}
