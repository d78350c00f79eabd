use ideas_types::{Friendship, Idea, NewUser, User};

use super::error::DbResult;

/// Storage seam shared by every handler.
///
/// Implementations are synchronous; callers run them on a blocking worker
/// (see [`crate::state::AppState::run_blocking`]).
pub trait DatabaseOperations: Send + Sync {
    /// All ideas ordered by ascending id
    fn list_ideas(&self) -> DbResult<Vec<Idea>>;

    /// Ideas owned by `user_id`, ordered by ascending id
    fn ideas_by_user(&self, user_id: i32) -> DbResult<Vec<Idea>>;

    /// Insert an idea with zeroed counters and return the stored row
    fn create_idea(&self, user_id: i32, title: &str, content: &str) -> DbResult<Idea>;

    /// Insert a user. A duplicate `(email, type)` fails with [`super::DbError::Conflict`].
    fn create_user(&self, user: &NewUser) -> DbResult<User>;

    /// First user registered with `email`, optionally narrowed to one type
    fn find_user_by_email(&self, email: &str, user_type: Option<&str>) -> DbResult<Option<User>>;

    /// Insert a pending edge from `user1_id` to `user2_id`
    fn send_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Friendship>;

    /// Mark the edge accepted; `None` when no edge matches
    fn accept_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>>;

    /// Delete the edge; `None` when no edge matches
    fn reject_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>>;

    /// Accepted edges where `user_id` is on either side
    fn friends_of(&self, user_id: i32) -> DbResult<Vec<Friendship>>;

    /// Pending edges sent by `user_id`
    fn pending_sent(&self, user_id: i32) -> DbResult<Vec<Friendship>>;

    /// Pending edges received by `user_id`
    fn pending_received(&self, user_id: i32) -> DbResult<Vec<Friendship>>;
}
