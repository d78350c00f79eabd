use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use ideas_types::{Friendship, FriendshipStatus, Idea, NewUser, User};

use super::error::{DbError, DbResult};
use super::operations::DatabaseOperations;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    ideas: Vec<Idea>,
    friends: Vec<Friendship>,
    last_user_id: i32,
    last_idea_id: i32,
}

impl Tables {
    fn require_user(&self, user_id: i32, column: &str) -> DbResult<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(DbError::MissingReference(format!("{column}={user_id}")))
        }
    }

    fn edges(&self, keep: impl Fn(&Friendship) -> bool) -> Vec<Friendship> {
        self.friends.iter().filter(|f| keep(*f)).cloned().collect()
    }
}

/// In-process storage with the same constraints as the PostgreSQL schema:
/// unique `(email, type)`, unique friendship pairs, and user foreign keys.
///
/// Rows are kept in insertion order, which is also id order.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> DbResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| DbError::Unavailable("in-memory tables lock poisoned".to_string()))
    }
}

impl DatabaseOperations for InMemoryDatabase {
    fn list_ideas(&self) -> DbResult<Vec<Idea>> {
        Ok(self.tables()?.ideas.clone())
    }

    fn ideas_by_user(&self, user_id: i32) -> DbResult<Vec<Idea>> {
        let tables = self.tables()?;
        Ok(tables
            .ideas
            .iter()
            .filter(|idea| idea.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create_idea(&self, user_id: i32, title: &str, content: &str) -> DbResult<Idea> {
        let mut tables = self.tables()?;
        tables.require_user(user_id, "user_id")?;

        tables.last_idea_id += 1;
        let idea = Idea {
            id: tables.last_idea_id,
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            likes: 0,
            views: 0,
        };
        tables.ideas.push(idea.clone());
        Ok(idea)
    }

    fn create_user(&self, user: &NewUser) -> DbResult<User> {
        let mut tables = self.tables()?;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email && u.user_type == user.user_type)
        {
            return Err(DbError::Conflict("users_email_type_key".to_string()));
        }

        tables.last_user_id += 1;
        let stored = User {
            id: tables.last_user_id,
            username: user.username.clone(),
            password: user.password.clone(),
            user_type: user.user_type.clone(),
            email: user.email.clone(),
        };
        tables.users.push(stored.clone());
        Ok(stored)
    }

    fn find_user_by_email(&self, email: &str, user_type: Option<&str>) -> DbResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && user_type.map_or(true, |t| u.user_type == t))
            .cloned())
    }

    fn send_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Friendship> {
        let mut tables = self.tables()?;
        tables.require_user(user1_id, "user1_id")?;
        tables.require_user(user2_id, "user2_id")?;
        if tables
            .friends
            .iter()
            .any(|f| f.user1_id == user1_id && f.user2_id == user2_id)
        {
            return Err(DbError::Conflict("friends_pkey".to_string()));
        }

        let friendship = Friendship {
            user1_id,
            user2_id,
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        };
        tables.friends.push(friendship.clone());
        Ok(friendship)
    }

    fn accept_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        let mut tables = self.tables()?;
        Ok(tables
            .friends
            .iter_mut()
            .find(|f| f.user1_id == user1_id && f.user2_id == user2_id)
            .map(|f| {
                f.status = FriendshipStatus::Accepted;
                f.clone()
            }))
    }

    fn reject_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        let mut tables = self.tables()?;
        let position = tables
            .friends
            .iter()
            .position(|f| f.user1_id == user1_id && f.user2_id == user2_id);
        Ok(position.map(|index| tables.friends.remove(index)))
    }

    fn friends_of(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        Ok(self
            .tables()?
            .edges(|f| f.involves(user_id) && f.status == FriendshipStatus::Accepted))
    }

    fn pending_sent(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        Ok(self
            .tables()?
            .edges(|f| f.user1_id == user_id && f.status == FriendshipStatus::Pending))
    }

    fn pending_received(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        Ok(self
            .tables()?
            .edges(|f| f.user2_id == user_id && f.status == FriendshipStatus::Pending))
    }
}
