use postgres::Row;

use ideas_types::{NewUser, User};

use crate::db::schema::USERS_EMAIL_TYPE;
use crate::db::{DbError, DbPool, DbResult};

const USER_COLUMNS: &str = "id, username, password, type, email";

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user and return the stored row
    ///
    /// The `(email, type)` unique index turns a duplicate into `DbError::Conflict`.
    pub fn create(&self, user: &NewUser) -> DbResult<User> {
        let mut conn = self.pool.get()?;
        let query = format!(
            "INSERT INTO users (username, password, type, email)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let row = conn.query_one(
            query.as_str(),
            &[&user.username, &user.password, &user.user_type, &user.email],
        )?;
        Ok(user_from_row(&row)?)
    }

    /// Create a user on a table without the `(email, type)` unique index
    ///
    /// An advisory lock on the pair serializes concurrent registrations, so the
    /// existence check and the insert cannot interleave.
    pub fn create_locked(&self, user: &NewUser) -> DbResult<User> {
        let mut conn = self.pool.get()?;
        let mut tx = conn.transaction()?;
        tx.execute(
            "SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))",
            &[&user.email, &user.user_type],
        )?;

        let existing = tx.query_opt(
            "SELECT id FROM users WHERE email = $1 AND type = $2 LIMIT 1",
            &[&user.email, &user.user_type],
        )?;
        if existing.is_some() {
            return Err(DbError::Conflict(USERS_EMAIL_TYPE.name.to_string()));
        }

        let query = format!(
            "INSERT INTO users (username, password, type, email)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let row = tx.query_one(
            query.as_str(),
            &[&user.username, &user.password, &user.user_type, &user.email],
        )?;
        let stored = user_from_row(&row)?;
        tx.commit()?;
        Ok(stored)
    }

    /// Get the earliest user registered with this email
    pub fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.get()?;
        let query =
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 ORDER BY id ASC LIMIT 1");
        let row = conn.query_opt(query.as_str(), &[&email])?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    /// Get user by email and type
    pub fn get_by_email_and_type(&self, email: &str, user_type: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.get()?;
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND type = $2");
        let row = conn.query_opt(query.as_str(), &[&email, &user_type])?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

fn user_from_row(row: &Row) -> Result<User, postgres::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        user_type: row.try_get("type")?,
        email: row.try_get("email")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{postgres_test_db, LegacySchema};
    use crate::db::DatabaseOperations;

    fn new_user(email: &str, user_type: &str) -> NewUser {
        NewUser {
            username: "alice".to_string(),
            password: "$2b$04$notarealhash".to_string(),
            user_type: user_type.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_duplicate_email_and_type_conflicts() {
        let db = postgres_test_db();
        let repo = UserRepository::new(db.pool.clone());
        let email = format!("dup-{}@example.com", std::process::id());

        repo.create(&new_user(&email, "student")).expect("first insert");
        let err = repo.create(&new_user(&email, "student")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");

        // Same email under another type is a separate account
        repo.create(&new_user(&email, "mentor")).expect("other type");
        let found = repo
            .get_by_email_and_type(&email, "mentor")
            .unwrap()
            .expect("mentor account");
        assert_eq!(found.user_type, "mentor");
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_duplicates_rejected_without_unique_index() {
        let legacy = LegacySchema::create(
            "CREATE TABLE users (
                 id SERIAL PRIMARY KEY,
                 username TEXT NOT NULL,
                 password TEXT NOT NULL,
                 type TEXT NOT NULL,
                 email TEXT NOT NULL
             );",
        );
        let mut db = legacy.database();
        db.detect_constraints().expect("detect constraints");
        assert!(!db.users_unique());

        let first = db.create_user(&new_user("a@x.com", "t")).expect("first insert");
        let err = db.create_user(&new_user("a@x.com", "t")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");

        let other = db.create_user(&new_user("a@x.com", "u")).expect("other type");
        assert_ne!(first.id, other.id);
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_initialize_tolerates_existing_duplicate_users() {
        let legacy = LegacySchema::create(
            "CREATE TABLE users (
                 id SERIAL PRIMARY KEY,
                 username TEXT NOT NULL,
                 password TEXT NOT NULL,
                 type TEXT NOT NULL,
                 email TEXT NOT NULL
             );
             INSERT INTO users (username, password, type, email)
             VALUES ('a', 'x', 't', 'a@x.com'), ('b', 'y', 't', 'a@x.com');",
        );
        let mut db = legacy.database();
        db.initialize().expect("initialize despite duplicates");
        db.detect_constraints().expect("detect constraints");
        assert!(!db.users_unique());

        let err = db.create_user(&new_user("a@x.com", "t")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
    }
}
