//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All repositories handed out by one [`InMemoryStore`] share the same
//! tables, so cascades across entities behave like the relational schema.
//! Note: Data is lost on process restart.

mod repositories;
mod tables;

use std::sync::Arc;

use tokio::sync::RwLock;

use blogicum_core::service::Repositories;

pub use repositories::{
    InMemoryCategoryRepository, InMemoryCommentRepository, InMemoryLocationRepository,
    InMemoryPostRepository, InMemoryRepository, InMemoryUserRepository,
};

use tables::Tables;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositories backed by this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(InMemoryUserRepository::new(self.tables.clone())),
            categories: Arc::new(InMemoryCategoryRepository::new(self.tables.clone())),
            locations: Arc::new(InMemoryLocationRepository::new(self.tables.clone())),
            posts: Arc::new(InMemoryPostRepository::new(self.tables.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(self.tables.clone())),
        }
    }
}
