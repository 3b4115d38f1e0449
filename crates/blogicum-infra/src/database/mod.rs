//! Database connection management and PostgreSQL repositories.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// PostgreSQL-backed repositories sharing this pool.
    pub fn repositories(&self) -> blogicum_core::service::Repositories {
        use std::sync::Arc;

        blogicum_core::service::Repositories {
            users: Arc::new(PostgresUserRepository::new(self.main.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(self.main.clone())),
            locations: Arc::new(PostgresLocationRepository::new(self.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(self.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(self.main.clone())),
        }
    }
}

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
