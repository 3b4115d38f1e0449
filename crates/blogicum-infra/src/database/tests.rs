use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, Value};
use uuid::Uuid;

use blogicum_core::PostFilter;
use blogicum_core::domain::{PageRequest, Post};
use blogicum_core::ports::{BaseRepository, CommentRepository, PostRepository};

use crate::database::entity::{category, comment, post, user};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, filtered_posts,
};

fn post_model(id: Uuid, author_id: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        text: "Content".to_owned(),
        pub_date: now.into(),
        location_id: None,
        category_id: None,
        image: None,
        is_published: true,
        created_at: now.into(),
    }
}

fn user_model(id: Uuid, username: &str) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password_hash: "hash".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn category_model(id: Uuid, slug: &str) -> category::Model {
    category::Model {
        id,
        title: "Travel".to_owned(),
        description: "Trips".to_owned(),
        slug: slug.to_owned(),
        is_published: true,
        created_at: Utc::now().into(),
    }
}

/// A row of the per-post comment count query.
fn count_row(post_id: Uuid, count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("post_id", Value::from(post_id)),
        ("total_comments", Value::from(count)),
    ])
}

fn num_items_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(total))])
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, author_id)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_comments_come_with_their_authors() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let now = Utc::now();

    let comments = vec![
        comment::Model {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text: "first".to_owned(),
            created_at: now.into(),
        },
        comment::Model {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text: "second".to_owned(),
            created_at: now.into(),
        },
    ];

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![comments])
        .append_query_results(vec![vec![user_model(author_id, "alice")]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let views = repo.list_for_post(post_id).await.unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].comment.text, "first");
    assert!(views.iter().all(|v| v.author.username == "alice"));
}

#[tokio::test]
async fn test_find_listing_attaches_author_category_and_comment_count() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let mut model = post_model(post_id, author_id);
    model.category_id = Some(category_id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .append_query_results(vec![vec![user_model(author_id, "alice")]])
        .append_query_results(vec![vec![category_model(category_id, "travel")]])
        .append_query_results(vec![vec![count_row(post_id, 3)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let listing = repo
        .find_listing(post_id)
        .await
        .unwrap()
        .expect("post should be found");

    assert_eq!(listing.post.id, post_id);
    assert_eq!(listing.author.username, "alice");
    assert_eq!(listing.category.map(|c| c.slug).as_deref(), Some("travel"));
    assert!(listing.location.is_none());
    assert_eq!(listing.comment_count, 3);

    let log = format!("{:?}", repo.db.into_transaction_log());
    assert!(log.contains("COUNT"), "{log}");
    assert!(log.contains("GROUP BY"), "{log}");
}

#[tokio::test]
async fn test_list_paginates_and_keeps_database_order() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let newer = Uuid::new_v4();
    let older = Uuid::new_v4();

    let mut newer_model = post_model(newer, alice);
    newer_model.title = "newer".to_owned();
    let mut older_model = post_model(older, bob);
    older_model.title = "older".to_owned();
    older_model.pub_date = (Utc::now() - TimeDelta::days(1)).into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![num_items_row(3)]])
        .append_query_results(vec![vec![newer_model, older_model]])
        .append_query_results(vec![vec![
            user_model(alice, "alice"),
            user_model(bob, "bob"),
        ]])
        .append_query_results(vec![vec![count_row(older, 2)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .list(&PostFilter::published(Utc::now()), PageRequest::new(1, 2))
        .await
        .unwrap();

    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    let titles: Vec<_> = page.items.iter().map(|l| l.post.title.as_str()).collect();
    assert_eq!(titles, ["newer", "older"]);
    assert_eq!(page.items[0].author.username, "alice");
    assert_eq!(page.items[0].comment_count, 0);
    assert_eq!(page.items[1].author.username, "bob");
    assert_eq!(page.items[1].comment_count, 2);

    let log = format!("{:?}", repo.db.into_transaction_log());
    assert!(log.contains("ORDER BY"), "{log}");
    assert!(log.contains("LIMIT"), "{log}");
}

#[tokio::test]
async fn test_find_listing_of_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_listing(Uuid::new_v4()).await.unwrap().is_none());
}

#[test]
fn test_public_filter_sql() {
    let sql = filtered_posts(&PostFilter::published(Utc::now()).with_published_category())
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#"LEFT JOIN "categories""#), "{sql}");
    assert!(sql.contains(r#""posts"."is_published" = TRUE"#), "{sql}");
    assert!(sql.contains(r#""posts"."pub_date" <="#), "{sql}");
    assert!(sql.contains(r#""posts"."category_id" IS NULL"#), "{sql}");
    assert!(sql.contains(r#""categories"."is_published" = TRUE"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "posts"."pub_date" DESC"#), "{sql}");
}

#[test]
fn test_owner_filter_sql_has_no_visibility_clauses() {
    let author_id = Uuid::new_v4();
    let sql = filtered_posts(&PostFilter::all().by_author(author_id))
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(&author_id.to_string()), "{sql}");
    assert!(!sql.contains(r#""is_published" = "#), "{sql}");
    assert!(!sql.contains("JOIN"), "{sql}");
}
