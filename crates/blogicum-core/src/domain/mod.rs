//! Domain entities - the core business objects.

mod category;
mod comment;
mod listing;
mod location;
mod pagination;
mod post;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use listing::{AuthorRef, CategoryRef, CommentView, LocationRef, PostListing};
pub use location::Location;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
pub use post::{MAX_TITLE_LENGTH, Post};
pub use user::{MAX_USERNAME_LENGTH, User};
