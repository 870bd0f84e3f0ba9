//! The post ledger: append-only, newest first.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, warn};

use plaza_shared::{PlazaError, PostId, Result, UserId};

use crate::database::lock;
use crate::models::{Post, User};
use crate::registry::UserRegistry;

#[derive(Debug, Default)]
pub struct PostLedger {
    // front = newest
    posts: Mutex<VecDeque<Post>>,
}

impl PostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a post as `author`.
    ///
    /// `author` is the session's current user; `None` means nobody is logged
    /// in and the call is rejected with [`PlazaError::InvalidSession`].  A
    /// post needs either non-blank content or an image.
    pub fn add_post(
        &self,
        author: Option<&UserId>,
        content: &str,
        image: Option<String>,
    ) -> Result<Post> {
        let author = author.ok_or(PlazaError::InvalidSession)?;
        let image = image.filter(|i| !i.trim().is_empty());
        if content.trim().is_empty() && image.is_none() {
            return Err(PlazaError::InvalidInput(
                "post needs text or an image".into(),
            ));
        }

        let post = Post {
            id: PostId::new(),
            author_id: author.clone(),
            content: content.to_string(),
            image,
            timestamp: Utc::now(),
        };

        let mut posts = lock(&self.posts, "posts")?;
        posts.push_front(post.clone());

        debug!(post = %post.id, author = %post.author_id, total = posts.len(), "post added");
        Ok(post)
    }

    /// All posts, newest first.
    pub fn list(&self) -> Result<Vec<Post>> {
        Ok(lock(&self.posts, "posts")?.iter().cloned().collect())
    }

    /// Posts by one author, newest first.
    pub fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>> {
        let posts = lock(&self.posts, "posts")?;
        Ok(posts
            .iter()
            .filter(|p| &p.author_id == author)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.posts, "posts")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn resolve_author(post: &Post, registry: &UserRegistry) -> Result<Option<User>> {
        registry.get(&post.author_id)
    }

    /// Posts paired with their authors, newest first.  Posts whose author no
    /// longer resolves are skipped.
    pub fn feed(&self, registry: &UserRegistry) -> Result<Vec<(Post, User)>> {
        // Snapshot first so the ledger lock is not held across registry lookups.
        let posts = self.list()?;
        let mut entries = Vec::with_capacity(posts.len());
        for post in posts {
            match Self::resolve_author(&post, registry)? {
                Some(author) => entries.push((post, author)),
                None => warn!(post = %post.id, author = %post.author_id, "skipping post with unknown author"),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn test_add_post_requires_author() {
        let ledger = PostLedger::new();
        assert_eq!(
            ledger.add_post(None, "hello", None),
            Err(PlazaError::InvalidSession)
        );
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn test_newest_first() {
        let ledger = PostLedger::new();
        let author = uid("u1");
        let mut ids = Vec::new();
        for i in 0..5 {
            let post = ledger.add_post(Some(&author), &format!("post {i}"), None).unwrap();
            assert_eq!(post.author_id, author);
            assert_eq!(ledger.list().unwrap()[0].id, post.id);
            ids.push(post.id);
        }
        ids.reverse();
        let listed: Vec<_> = ledger.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_blank_post_rejected_unless_image() {
        let ledger = PostLedger::new();
        let author = uid("u1");
        assert!(matches!(
            ledger.add_post(Some(&author), "   ", None),
            Err(PlazaError::InvalidInput(_))
        ));
        assert!(matches!(
            ledger.add_post(Some(&author), "", Some(" ".into())),
            Err(PlazaError::InvalidInput(_))
        ));
        let post = ledger
            .add_post(Some(&author), "", Some("https://img/1.png".into()))
            .unwrap();
        assert_eq!(post.image.as_deref(), Some("https://img/1.png"));
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_list_by_author() {
        let ledger = PostLedger::new();
        let (a, b) = (uid("a"), uid("b"));
        ledger.add_post(Some(&a), "one", None).unwrap();
        ledger.add_post(Some(&b), "two", None).unwrap();
        ledger.add_post(Some(&a), "three", None).unwrap();

        let contents: Vec<_> = ledger
            .list_by_author(&a)
            .unwrap()
            .into_iter()
            .map(|p| p.content)
            .collect();
        assert_eq!(contents, vec!["three", "one"]);
    }

    #[test]
    fn test_feed_skips_unknown_authors() {
        let registry = UserRegistry::default();
        let alice = registry.create("Alice", "alice@x.com", 30, None).unwrap();

        let ledger = PostLedger::new();
        ledger.add_post(Some(&alice.id), "mine", None).unwrap();
        ledger.add_post(Some(&uid("ghost")), "orphan", None).unwrap();

        let feed = ledger.feed(&registry).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].0.content, "mine");
        assert_eq!(feed[0].1, alice);
        assert_eq!(ledger.len().unwrap(), 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        // Property: after N additions the ledger is the reverse of call order
        proptest! {
            #[test]
            fn prop_reverse_call_order(contents in prop::collection::vec("[a-z]{1,8}", 1..20)) {
                let ledger = PostLedger::new();
                let author = uid("u1");
                for c in &contents {
                    ledger.add_post(Some(&author), c, None).unwrap();
                }
                let listed: Vec<String> = ledger.list().unwrap().into_iter().map(|p| p.content).collect();
                let mut expected = contents.clone();
                expected.reverse();
                prop_assert_eq!(listed, expected);
            }
        }
    }
}
