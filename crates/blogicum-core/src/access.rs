//! Ownership checks for mutating actions.
//!
//! A caller who does not own a post or comment is not an error case: they
//! are sent back to a read-only view instead.

use uuid::Uuid;

/// Read-only view a denied caller is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    Index,
    PostDetail(Uuid),
}

/// Outcome of an ownership-gated action.
#[derive(Debug, Clone, PartialEq)]
pub enum Access<T> {
    Granted(T),
    Redirect(RedirectTarget),
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Access<U> {
        match self {
            Access::Granted(value) => Access::Granted(f(value)),
            Access::Redirect(target) => Access::Redirect(target),
        }
    }
}

/// Allow the action only when `viewer` is `owner`.
pub fn ensure_author(
    owner: Uuid,
    viewer: Uuid,
    on_denied: RedirectTarget,
) -> Result<(), RedirectTarget> {
    if owner == viewer {
        Ok(())
    } else {
        tracing::debug!(%owner, %viewer, ?on_denied, "Ownership check failed");
        Err(on_denied)
    }
}
