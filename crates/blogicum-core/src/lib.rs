//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the post visibility filter, ownership checks and the use-cases
//! built on top of the repository ports.

pub mod access;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod visibility;

pub use access::{Access, RedirectTarget};
pub use error::DomainError;
pub use service::BlogService;
pub use visibility::PostFilter;
