//! Post visibility filter.
//!
//! A [`PostFilter`] describes which posts a listing may show. Repositories
//! translate it into their own query language; [`PostFilter::matches`] is
//! the in-memory reading of the same rules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Only posts with `is_published` set.
    pub published_only: bool,
    /// Only posts whose `pub_date` is at or before this instant.
    pub published_before: Option<DateTime<Utc>>,
    /// Only posts without a category or in a published one.
    pub category_published: bool,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl PostFilter {
    /// No restriction at all; used for an author's own profile.
    pub fn all() -> Self {
        Self::default()
    }

    /// Published posts whose publication date has come.
    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            published_only: true,
            published_before: Some(now),
            ..Self::default()
        }
    }

    pub fn with_published_category(mut self) -> Self {
        self.category_published = true;
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Evaluate the filter against a post and its (already resolved) category.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.published_only && !post.is_published {
            return false;
        }
        if let Some(now) = self.published_before {
            if post.pub_date > now {
                return false;
            }
        }
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if post.category_id != Some(category_id) {
                return false;
            }
        }
        if self.category_published && category.is_some_and(|c| !c.is_published) {
            return false;
        }
        true
    }
}
