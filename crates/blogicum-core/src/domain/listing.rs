//! Read models: entities joined with the data a listing needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Comment, Location, Post, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

impl From<&Category> for CategoryRef {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            slug: category.slug.clone(),
            is_published: category.is_published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Location> for LocationRef {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
        }
    }
}

/// A post with its author, category, location and comment count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostListing {
    pub post: Post,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub comment_count: u64,
}

impl PostListing {
    /// Published, not scheduled, and not filed under a hidden category.
    pub fn is_public_at(&self, now: DateTime<Utc>) -> bool {
        self.post.is_released_at(now)
            && self.category.as_ref().is_none_or(|c| c.is_published)
    }
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: AuthorRef,
}
