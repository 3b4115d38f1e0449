//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::BlogService;
use blogicum_core::service::Repositories;
use blogicum_infra::InMemoryStore;

#[cfg(feature = "postgres")]
use blogicum_infra::DatabaseConnections;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabaseConnections>,
}

impl AppState {
    /// Build the state, falling back to the in-memory store when the
    /// database is not configured or unreachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let state = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => Self {
                    blog: Arc::new(BlogService::new(
                        connections.repositories(),
                        config.posts_per_page,
                    )),
                    db: Some(connections),
                },
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database. Using in-memory store.");
                    Self::in_memory(config.posts_per_page)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Self::in_memory(config.posts_per_page)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory(config.posts_per_page)
        };

        tracing::info!(storage = state.storage(), "Application state initialized");
        state
    }

    pub fn in_memory(posts_per_page: u64) -> Self {
        Self::with_repositories(InMemoryStore::new().repositories(), posts_per_page)
    }

    pub fn with_repositories(repos: Repositories, posts_per_page: u64) -> Self {
        Self {
            blog: Arc::new(BlogService::new(repos, posts_per_page)),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Backend name reported by the health endpoint.
    #[cfg(feature = "postgres")]
    pub fn storage(&self) -> &'static str {
        if self.db.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    #[cfg(not(feature = "postgres"))]
    pub fn storage(&self) -> &'static str {
        "memory"
    }
}
