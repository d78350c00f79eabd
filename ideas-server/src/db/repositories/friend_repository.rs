use chrono::{DateTime, Utc};
use postgres::Row;

use ideas_types::{Friendship, FriendshipStatus};

use crate::db::{DbError, DbPool, DbResult};

/// `created_at` may be `TIMESTAMP` or `TIMESTAMPTZ`; the cast decodes both
const FRIEND_COLUMNS: &str = "user1_id, user2_id, status, created_at::timestamptz AS created_at";

pub struct FriendRepository {
    pool: DbPool,
}

impl FriendRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a pending request from user1 to user2
    pub fn send_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Friendship> {
        let mut conn = self.pool.get()?;
        let query = format!(
            "INSERT INTO friends (user1_id, user2_id, status, created_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING {FRIEND_COLUMNS}"
        );
        let row = conn.query_one(
            query.as_str(),
            &[&user1_id, &user2_id, &FriendshipStatus::Pending.as_str()],
        )?;
        friendship_from_row(&row)
    }

    /// Accept a request, whatever its current status
    ///
    /// Tables without the pair index may hold the same edge twice; all copies
    /// are updated and the first is returned.
    pub fn accept_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        let mut conn = self.pool.get()?;
        let query = format!(
            "UPDATE friends SET status = $1
             WHERE user1_id = $2 AND user2_id = $3
             RETURNING {FRIEND_COLUMNS}"
        );
        let rows = conn.query(
            query.as_str(),
            &[&FriendshipStatus::Accepted.as_str(), &user1_id, &user2_id],
        )?;
        rows.first().map(friendship_from_row).transpose()
    }

    /// Delete a request (or an accepted friendship) and return what was removed
    pub fn reject_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        let mut conn = self.pool.get()?;
        let query = format!(
            "DELETE FROM friends
             WHERE user1_id = $1 AND user2_id = $2
             RETURNING {FRIEND_COLUMNS}"
        );
        let rows = conn.query(query.as_str(), &[&user1_id, &user2_id])?;
        rows.first().map(friendship_from_row).transpose()
    }

    /// Get accepted friendships in either direction
    pub fn get_friends(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.query_edges(
            "(user1_id = $1 OR user2_id = $1) AND status = $2",
            user_id,
            FriendshipStatus::Accepted,
        )
    }

    /// Get pending requests this user has sent
    pub fn get_pending_sent(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.query_edges("user1_id = $1 AND status = $2", user_id, FriendshipStatus::Pending)
    }

    /// Get pending requests this user has received
    pub fn get_pending_received(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.query_edges("user2_id = $1 AND status = $2", user_id, FriendshipStatus::Pending)
    }

    fn query_edges(
        &self,
        filter: &str,
        user_id: i32,
        status: FriendshipStatus,
    ) -> DbResult<Vec<Friendship>> {
        let mut conn = self.pool.get()?;
        let query =
            format!("SELECT {FRIEND_COLUMNS} FROM friends WHERE {filter} ORDER BY created_at ASC");
        let rows = conn.query(query.as_str(), &[&user_id, &status.as_str()])?;
        rows.iter().map(friendship_from_row).collect()
    }
}

fn friendship_from_row(row: &Row) -> DbResult<Friendship> {
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Friendship {
        user1_id: row.try_get("user1_id")?,
        user2_id: row.try_get("user2_id")?,
        status: FriendshipStatus::parse(&status)
            .ok_or_else(|| DbError::Decode(format!("unknown friendship status '{}'", status)))?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{postgres_test_db, seed_user, LegacySchema};

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_request_lifecycle() {
        let db = postgres_test_db();
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let repo = FriendRepository::new(db.pool.clone());

        let sent = repo.send_request(alice, bob).unwrap();
        assert_eq!(sent.status, FriendshipStatus::Pending);
        assert!(matches!(
            repo.send_request(alice, bob).unwrap_err(),
            DbError::Conflict(_)
        ));
        assert_eq!(repo.get_pending_sent(alice).unwrap().len(), 1);
        assert_eq!(repo.get_pending_received(bob).unwrap().len(), 1);

        let accepted = repo.accept_request(alice, bob).unwrap().expect("edge");
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        assert_eq!(repo.get_friends(alice).unwrap(), vec![accepted.clone()]);
        assert_eq!(repo.get_friends(bob).unwrap(), vec![accepted]);

        assert!(repo.reject_request(alice, bob).unwrap().is_some());
        assert!(repo.get_friends(bob).unwrap().is_empty());
        assert!(repo.reject_request(alice, bob).unwrap().is_none());
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_duplicate_edges_on_table_without_pair_index() {
        let legacy = LegacySchema::create(
            "CREATE TABLE users (
                 id SERIAL PRIMARY KEY,
                 username TEXT NOT NULL,
                 password TEXT NOT NULL,
                 type TEXT NOT NULL,
                 email TEXT NOT NULL
             );
             INSERT INTO users (username, password, type, email)
             VALUES ('alice', 'x', 'member', 'a@x.com'), ('bob', 'y', 'member', 'b@x.com');
             CREATE TABLE friends (
                 user1_id INTEGER NOT NULL,
                 user2_id INTEGER NOT NULL,
                 status VARCHAR(16) NOT NULL DEFAULT 'pending',
                 created_at TIMESTAMP NOT NULL DEFAULT NOW()
             );
             INSERT INTO friends (user1_id, user2_id, status, created_at)
             VALUES (1, 2, 'pending', NOW()), (1, 2, 'pending', NOW());",
        );
        let db = legacy.database();
        db.initialize().expect("initialize despite duplicate edges");
        let repo = FriendRepository::new(db.pool.clone());

        // A third copy still goes in; nothing enforces the pair
        let sent = repo.send_request(1, 2).unwrap();
        assert_eq!(sent.status, FriendshipStatus::Pending);
        assert_eq!(repo.get_pending_sent(1).unwrap().len(), 3);

        let accepted = repo.accept_request(1, 2).unwrap().expect("edge");
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        let friends = repo.get_friends(2).unwrap();
        assert_eq!(friends.len(), 3);
        assert!(friends.iter().all(|f| f.status == FriendshipStatus::Accepted));

        assert!(repo.reject_request(1, 2).unwrap().is_some());
        assert!(repo.get_friends(1).unwrap().is_empty());
        assert!(repo.reject_request(1, 2).unwrap().is_none());
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_timestamp_without_time_zone_decodes() {
        let legacy = LegacySchema::create(
            "CREATE TABLE users (
                 id SERIAL PRIMARY KEY,
                 username TEXT NOT NULL,
                 password TEXT NOT NULL,
                 type TEXT NOT NULL,
                 email TEXT NOT NULL
             );
             INSERT INTO users (username, password, type, email)
             VALUES ('alice', 'x', 'member', 'a@x.com'), ('bob', 'y', 'member', 'b@x.com');
             CREATE TABLE friends (
                 user1_id INTEGER NOT NULL,
                 user2_id INTEGER NOT NULL,
                 status VARCHAR(16) NOT NULL,
                 created_at TIMESTAMP NOT NULL
             );",
        );
        let repo = FriendRepository::new(legacy.database().pool);

        let sent = repo.send_request(1, 2).unwrap();
        assert_eq!(repo.get_pending_sent(1).unwrap(), vec![sent.clone()]);
        assert_eq!(repo.get_pending_received(2).unwrap(), vec![sent]);
    }
}
