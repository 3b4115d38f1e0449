use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access::{Access, RedirectTarget, ensure_author};
use crate::domain::{
    AuthorRef, Category, Comment, CommentView, Page, PageRequest, Post, PostListing, User,
};
use crate::error::DomainError;
use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use crate::visibility::PostFilter;

use super::input::{CommentInput, PostInput};

/// The repositories the blog reads from and writes to.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Page<PostListing>,
}

#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub profile: User,
    pub posts: Page<PostListing>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostListing,
    pub comments: Vec<CommentView>,
}

/// Blog use-cases: public listings, post pages and author-only mutations.
pub struct BlogService {
    repos: Repositories,
    per_page: u64,
}

impl BlogService {
    pub fn new(repos: Repositories, per_page: u64) -> Self {
        Self {
            repos,
            per_page: per_page.max(1),
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    fn page(&self, page: u64) -> PageRequest {
        PageRequest::new(page, self.per_page)
    }

    /// Front page: publicly visible posts across all published categories.
    pub async fn index(&self, page: u64) -> Result<Page<PostListing>, DomainError> {
        let filter = PostFilter::published(Utc::now()).with_published_category();
        Ok(self.repos.posts.list(&filter, self.page(page)).await?)
    }

    /// Posts of one published category.
    pub async fn category_posts(&self, slug: &str, page: u64) -> Result<CategoryPage, DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let filter = PostFilter::published(Utc::now()).in_category(category.id);
        let posts = self.repos.posts.list(&filter, self.page(page)).await?;

        Ok(CategoryPage { category, posts })
    }

    /// An author's page. The author sees every post of theirs, drafts and
    /// scheduled ones included; everybody else sees the released ones.
    pub async fn profile(
        &self,
        viewer: Option<Uuid>,
        username: &str,
        page: u64,
    ) -> Result<ProfilePage, DomainError> {
        let profile = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let filter = if viewer == Some(profile.id) {
            PostFilter::all().by_author(profile.id)
        } else {
            PostFilter::published(Utc::now()).by_author(profile.id)
        };
        let posts = self.repos.posts.list(&filter, self.page(page)).await?;

        Ok(ProfilePage { profile, posts })
    }

    /// A post with its comments. Hidden posts exist only for their author.
    pub async fn post_detail(
        &self,
        viewer: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<PostDetail, DomainError> {
        let post = self.visible_post(viewer, post_id).await?;
        let comments = self.repos.comments.list_for_post(post_id).await?;

        Ok(PostDetail { post, comments })
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        input: PostInput,
    ) -> Result<PostListing, DomainError> {
        input.validate()?;
        self.author(author_id).await?;
        self.check_references(&input).await?;

        let pub_date = input.pub_date.unwrap_or_else(Utc::now);
        let mut post = Post::new(author_id, input.title.clone(), input.text.clone(), pub_date);
        post.category_id = input.category_id;
        post.location_id = input.location_id;
        post.image = input.image();
        post.is_published = input.is_published;

        let post = self.repos.posts.create(post).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");

        self.listing(post.id).await
    }

    /// Edit a post; anyone but the author is sent back to the post page.
    pub async fn update_post(
        &self,
        viewer: Uuid,
        post_id: Uuid,
        input: PostInput,
    ) -> Result<Access<PostListing>, DomainError> {
        let mut post = self.post(post_id).await?;
        if let Err(target) =
            ensure_author(post.author_id, viewer, RedirectTarget::PostDetail(post_id))
        {
            return Ok(Access::Redirect(target));
        }

        input.validate()?;
        self.check_references(&input).await?;

        post.title = input.title.clone();
        post.text = input.text.clone();
        if let Some(pub_date) = input.pub_date {
            post.pub_date = pub_date;
        }
        post.category_id = input.category_id;
        post.location_id = input.location_id;
        post.image = input.image();
        post.is_published = input.is_published;

        self.repos.posts.update(post).await?;
        tracing::info!(post_id = %post_id, "Post updated");

        Ok(Access::Granted(self.listing(post_id).await?))
    }

    /// Delete a post and its comments; anyone but the author is sent to the index.
    pub async fn delete_post(&self, viewer: Uuid, post_id: Uuid) -> Result<Access<()>, DomainError> {
        let post = self.post(post_id).await?;
        if let Err(target) = ensure_author(post.author_id, viewer, RedirectTarget::Index) {
            return Ok(Access::Redirect(target));
        }

        self.repos.posts.delete(post_id).await?;
        tracing::info!(post_id = %post_id, "Post deleted");

        Ok(Access::Granted(()))
    }

    /// Comment on a post the caller is allowed to see.
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        input: CommentInput,
    ) -> Result<CommentView, DomainError> {
        input.validate()?;
        let author = self.author(author_id).await?;
        self.visible_post(Some(author_id), post_id).await?;

        let comment = self
            .repos
            .comments
            .create(Comment::new(post_id, author_id, input.text))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");

        Ok(CommentView {
            comment,
            author: AuthorRef::from(&author),
        })
    }

    pub async fn update_comment(
        &self,
        viewer: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
        input: CommentInput,
    ) -> Result<Access<CommentView>, DomainError> {
        let mut comment = self.comment(post_id, comment_id).await?;
        if let Err(target) =
            ensure_author(comment.author_id, viewer, RedirectTarget::PostDetail(post_id))
        {
            return Ok(Access::Redirect(target));
        }

        input.validate()?;
        comment.text = input.text;
        let comment = self.repos.comments.update(comment).await?;
        let author = self.author(viewer).await?;
        tracing::info!(comment_id = %comment_id, "Comment updated");

        Ok(Access::Granted(CommentView {
            comment,
            author: AuthorRef::from(&author),
        }))
    }

    pub async fn delete_comment(
        &self,
        viewer: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Access<()>, DomainError> {
        let comment = self.comment(post_id, comment_id).await?;
        if let Err(target) =
            ensure_author(comment.author_id, viewer, RedirectTarget::PostDetail(post_id))
        {
            return Ok(Access::Redirect(target));
        }

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, "Comment deleted");

        Ok(Access::Granted(()))
    }

    async fn post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn listing(&self, post_id: Uuid) -> Result<PostListing, DomainError> {
        self.repos
            .posts
            .find_listing(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn visible_post(
        &self,
        viewer: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<PostListing, DomainError> {
        let post = self.listing(post_id).await?;
        let is_author = viewer.is_some_and(|id| post.post.is_authored_by(id));
        if is_author || post.is_public_at(Utc::now()) {
            Ok(post)
        } else {
            Err(DomainError::not_found("post", post_id))
        }
    }

    /// The comment, provided it belongs to `post_id`.
    async fn comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    /// The acting user; a token for a deleted account no longer authorizes anything.
    async fn author(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    async fn check_references(&self, input: &PostInput) -> Result<(), DomainError> {
        if let Some(category_id) = input.category_id {
            if self.repos.categories.find_by_id(category_id).await?.is_none() {
                return Err(DomainError::Validation(format!(
                    "unknown category {category_id}"
                )));
            }
        }
        if let Some(location_id) = input.location_id {
            if self.repos.locations.find_by_id(location_id).await?.is_none() {
                return Err(DomainError::Validation(format!(
                    "unknown location {location_id}"
                )));
            }
        }
        Ok(())
    }
}
