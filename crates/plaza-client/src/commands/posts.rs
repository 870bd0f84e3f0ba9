use serde::Serialize;

use plaza_store::{Post, User};

use super::{lock, parse_user_id, CommandResult};
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntryDto {
    pub post: Post,
    pub author: User,
}

pub fn add_post(
    state: &SharedState,
    content: String,
    image: Option<String>,
) -> CommandResult<Post> {
    let guard = lock(state)?;
    Ok(guard.session.add_post(&content, image)?)
}

/// Every post, newest first.
pub fn get_posts(state: &SharedState) -> CommandResult<Vec<Post>> {
    let guard = lock(state)?;
    Ok(guard.session.posts()?)
}

/// One user's posts, newest first.
pub fn get_posts_by_user(state: &SharedState, user_id: String) -> CommandResult<Vec<Post>> {
    let author = parse_user_id(&user_id)?;
    let guard = lock(state)?;
    Ok(guard.session.posts_by(&author)?)
}

/// Posts joined with their authors, newest first.
pub fn get_feed(state: &SharedState) -> CommandResult<Vec<FeedEntryDto>> {
    let guard = lock(state)?;
    Ok(guard
        .session
        .feed()?
        .into_iter()
        .map(|(post, author)| FeedEntryDto { post, author })
        .collect())
}
