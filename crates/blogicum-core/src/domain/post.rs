use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of post and category titles.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Post entity - a publishable blog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    /// A date in the future schedules the post.
    pub pub_date: DateTime<Utc>,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            pub_date,
            location_id: None,
            category_id: None,
            image: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    /// Whether the post's own flags allow public display at `now`.
    ///
    /// The category's flag is checked separately, see [`crate::PostFilter`].
    pub fn is_released_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.pub_date <= now
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn scheduled_post_is_not_released() {
        let now = Utc::now();
        let post = Post::new(Uuid::new_v4(), "t".into(), "x".into(), now + TimeDelta::hours(1));

        assert!(!post.is_released_at(now));
        assert!(post.is_released_at(now + TimeDelta::hours(2)));
    }

    #[test]
    fn hidden_post_is_not_released() {
        let now = Utc::now();
        let mut post = Post::new(Uuid::new_v4(), "t".into(), "x".into(), now);
        post.is_published = false;

        assert!(!post.is_released_at(now));
    }
}
