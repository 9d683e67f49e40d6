//! Persistence for users, saved matches, and uploaded images.
//!
//! [`MatchStore`] is the seam; [`InMemoryMatchStore`] keeps records in
//! process and writes images to disk through [`ImageStore`].

pub mod error;
pub mod images;
pub mod memory;
mod model;

pub use error::{StoreError, StoreResult};
pub use images::ImageStore;
pub use memory::InMemoryMatchStore;
pub use model::{MatchRecord, NewMatch, User};

/// User and match-history persistence.
///
/// Implementations are shared behind an `Arc` and may block (file I/O);
/// async callers should run them on the blocking pool.
pub trait MatchStore: Send + Sync {
    /// Returns the user with `login_id`, creating it on first use.
    fn create_or_get_user(&self, login_id: &str) -> StoreResult<User>;

    fn get_user(&self, user_id: &str) -> StoreResult<Option<User>>;

    fn find_user_by_login(&self, login_id: &str) -> StoreResult<Option<User>>;

    /// Stores the image and the match; returns the new match id.
    fn save_match(&self, new_match: NewMatch) -> StoreResult<String>;

    /// Matches for `user_id`, newest first.
    fn list_matches(&self, user_id: &str) -> StoreResult<Vec<MatchRecord>>;

    fn get_match(&self, match_id: &str) -> StoreResult<Option<MatchRecord>>;

    /// Deletes the match and its stored image. Returns `false` if no such match.
    fn delete_match(&self, match_id: &str) -> StoreResult<bool>;
}
