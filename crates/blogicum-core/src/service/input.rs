//! Validated inputs for the mutating use-cases.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::MAX_TITLE_LENGTH;
use crate::error::DomainError;

/// Fields an author controls when creating or editing a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    /// `None` means "now" on create and "unchanged" on edit.
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
}

impl PostInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        } else if self.title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(format!("title must be at most {MAX_TITLE_LENGTH} characters"));
        }
        if self.text.trim().is_empty() {
            errors.push("text must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors.join(", ")))
        }
    }

    /// Blank image strings mean "no image".
    pub(crate) fn image(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::Validation(
                "comment text must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
