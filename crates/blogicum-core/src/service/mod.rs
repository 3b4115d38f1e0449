//! Use-cases of the blog, composed from the repository ports.

mod blog;
mod input;

pub use blog::{BlogService, CategoryPage, PostDetail, ProfilePage, Repositories};
pub use input::{CommentInput, PostInput};
