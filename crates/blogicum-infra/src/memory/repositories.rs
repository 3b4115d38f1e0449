use std::cmp::Reverse;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::PostFilter;
use blogicum_core::domain::{
    AuthorRef, Category, CategoryRef, Comment, CommentView, Location, LocationRef, Page,
    PageRequest, Post, PostListing, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};

use super::tables::{Stored, Tables};

/// Generic in-memory repository over one table of the shared store.
pub struct InMemoryRepository<T> {
    tables: Arc<RwLock<Tables>>,
    _entity: PhantomData<T>,
}

impl<T> InMemoryRepository<T> {
    pub(crate) fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            _entity: PhantomData,
        }
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryLocationRepository = InMemoryRepository<Location>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::rows(&tables).iter().find(|row| row.id() == id).cloned())
    }

    async fn create(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::rows(&tables).iter().any(|row| row.id() == entity.id()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        entity.check_constraints(&tables)?;

        T::rows_mut(&mut tables).push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        entity.check_constraints(&tables)?;

        let row = T::rows_mut(&mut tables)
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(RepoError::NotFound)?;
        *row = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::remove(&mut tables, id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
    }
}

impl LocationRepository for InMemoryLocationRepository {}

fn author_ref(tables: &Tables, author_id: Uuid) -> AuthorRef {
    // The author row always exists: deleting a user removes their posts and comments.
    tables.user(author_id).map(AuthorRef::from).unwrap_or(AuthorRef {
        id: author_id,
        username: String::new(),
    })
}

fn listing(tables: &Tables, post: Post) -> PostListing {
    PostListing {
        author: author_ref(tables, post.author_id),
        category: post
            .category_id
            .and_then(|id| tables.category(id))
            .map(CategoryRef::from),
        location: post
            .location_id
            .and_then(|id| tables.location(id))
            .map(LocationRef::from),
        comment_count: tables
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as u64,
        post,
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| {
                let category = p.category_id.and_then(|id| tables.category(id));
                filter.matches(p, category)
            })
            .cloned()
            .collect();
        posts.sort_by_key(|p| Reverse((p.pub_date, p.created_at)));

        Ok(Page::from_all(posts, page).map(|post| listing(&tables, post)))
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError> {
        let tables = self.tables.read().await;
        let post = tables.posts.iter().find(|p| p.id == id).cloned();
        Ok(post.map(|post| listing(&tables, post)))
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                author: author_ref(&tables, comment.author_id),
                comment,
            })
            .collect())
    }
}
