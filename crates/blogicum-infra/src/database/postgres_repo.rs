//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::PostFilter;
use blogicum_core::domain::{
    AuthorRef, Category, CategoryRef, CommentView, LocationRef, Page, PageRequest, PostListing,
    User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Mask an email address for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

impl LocationRepository for PostgresLocationRepository {}

/// Translate a [`PostFilter`] into a select over `posts`, newest first.
pub(crate) fn filtered_posts(filter: &PostFilter) -> Select<PostEntity> {
    let mut query = PostEntity::find();
    let mut condition = Condition::all();

    if filter.published_only {
        condition = condition.add(post::Column::IsPublished.eq(true));
    }
    if let Some(now) = filter.published_before {
        condition = condition.add(post::Column::PubDate.lte(now));
    }
    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if filter.category_published {
        query = query.join(JoinType::LeftJoin, post::Relation::Category.def());
        condition = condition.add(
            Condition::any()
                .add(post::Column::CategoryId.is_null())
                .add(category::Column::IsPublished.eq(true)),
        );
    }

    query
        .filter(condition)
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::CreatedAt)
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    ids.collect::<HashSet<_>>().into_iter().collect()
}

async fn load_authors(db: &DbConn, ids: Vec<Uuid>) -> Result<HashMap<Uuid, AuthorRef>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = UserEntity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(query_error)?;

    Ok(users
        .into_iter()
        .map(|u| {
            (
                u.id,
                AuthorRef {
                    id: u.id,
                    username: u.username,
                },
            )
        })
        .collect())
}

/// Attach authors, categories, locations and comment counts to a page of posts.
async fn annotate(db: &DbConn, models: Vec<post::Model>) -> Result<Vec<PostListing>, RepoError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let authors = load_authors(db, distinct(models.iter().map(|m| m.author_id))).await?;

    let category_ids = distinct(models.iter().filter_map(|m| m.category_id));
    let categories: HashMap<Uuid, CategoryRef> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    CategoryRef {
                        id: c.id,
                        title: c.title,
                        slug: c.slug,
                        is_published: c.is_published,
                    },
                )
            })
            .collect()
    };

    let location_ids = distinct(models.iter().filter_map(|m| m.location_id));
    let locations: HashMap<Uuid, LocationRef> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|l| (l.id, LocationRef { id: l.id, name: l.name }))
            .collect()
    };

    let counts: HashMap<Uuid, i64> = CommentEntity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "total_comments")
        .filter(comment::Column::PostId.is_in(post_ids))
        .group_by(comment::Column::PostId)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await
        .map_err(query_error)?
        .into_iter()
        .collect();

    models
        .into_iter()
        .map(|model| {
            let author = authors
                .get(&model.author_id)
                .cloned()
                .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?;
            let category = model.category_id.and_then(|id| categories.get(&id).cloned());
            let location = model.location_id.and_then(|id| locations.get(&id).cloned());
            let comment_count = counts.get(&model.id).copied().unwrap_or(0).max(0) as u64;

            Ok(PostListing {
                post: model.into(),
                author,
                category,
                location,
                comment_count,
            })
        })
        .collect()
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, RepoError> {
        tracing::debug!(?filter, page = page.page, "Listing posts");

        let paginator = filtered_posts(filter).paginate(&self.db, page.per_page);
        let total = paginator.num_items().await.map_err(query_error)?;
        let models = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(query_error)?;

        let items = annotate(&self.db, models).await?;
        Ok(Page::new(items, page, total))
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<PostListing>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(annotate(&self.db, vec![model]).await?.pop())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let authors = load_authors(&self.db, distinct(models.iter().map(|m| m.author_id))).await?;

        models
            .into_iter()
            .map(|model| {
                let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author", model.id))
                })?;
                Ok(CommentView {
                    comment: model.into(),
                    author,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
