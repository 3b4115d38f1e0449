use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;

/// Rows kept in insertion order.
#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

impl Tables {
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn has_post(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }
}

/// An entity stored in [`Tables`], with the constraints its SQL table enforces.
pub trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn rows(tables: &Tables) -> &Vec<Self>;

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// Unique and foreign-key checks before a write.
    fn check_constraints(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Remove the row and apply the delete rules of rows referencing it.
    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let rows = Self::rows_mut(tables);
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        rows.len() != before
    }
}

fn missing(what: &str) -> RepoError {
    RepoError::Constraint(format!("Referenced {what} does not exist"))
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.users
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .iter()
            .any(|u| u.id != self.id && (u.username == self.username || u.email == self.email));
        if taken {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return false;
        }

        let own_posts: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in own_posts {
            Post::remove(tables, post_id);
        }
        tables.comments.retain(|c| c.author_id != id);
        true
    }
}

impl Stored for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.categories
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .categories
            .iter()
            .any(|c| c.id != self.id && c.slug == self.slug)
        {
            return Err(RepoError::Constraint(format!(
                "Category slug '{}' already exists",
                self.slug
            )));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return false;
        }
        for post in tables.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        true
    }
}

impl Stored for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.locations
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.locations
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let before = tables.locations.len();
        tables.locations.retain(|l| l.id != id);
        if tables.locations.len() == before {
            return false;
        }
        for post in tables.posts.iter_mut().filter(|p| p.location_id == Some(id)) {
            post.location_id = None;
        }
        true
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.posts
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables.user(self.author_id).is_none() {
            return Err(missing("author"));
        }
        if self.category_id.is_some_and(|id| tables.category(id).is_none()) {
            return Err(missing("category"));
        }
        if self.location_id.is_some_and(|id| tables.location(id).is_none()) {
            return Err(missing("location"));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return false;
        }
        tables.comments.retain(|c| c.post_id != id);
        true
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &Vec<Self> {
        &tables.comments
    }

    fn rows_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.comments
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.has_post(self.post_id) {
            return Err(missing("post"));
        }
        if tables.user(self.author_id).is_none() {
            return Err(missing("author"));
        }
        Ok(())
    }
}
