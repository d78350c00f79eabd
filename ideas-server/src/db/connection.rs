use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use postgres::error::SqlState;
use r2d2_postgres::{postgres::NoTls, PostgresConnectionManager};

use ideas_types::{Friendship, Idea, NewUser, User};

use super::error::DbResult;
use super::operations::DatabaseOperations;
use super::repositories::{FriendRepository, IdeaRepository, UserRepository};
use super::schema::{UniqueIndex, HAS_UNIQUE_INDEX, SCHEMA, UNIQUE_INDEXES, USERS_EMAIL_TYPE};
use crate::config;

pub type DbPool = Pool<PostgresConnectionManager<NoTls>>;
pub type DbConnection = PooledConnection<PostgresConnectionManager<NoTls>>;

/// PostgreSQL database wrapper with connection pooling support
///
/// Every method blocks; call it from a blocking worker, never from the async runtime.
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
    /// Whether `users` has the `(email, type)` unique index; see [`Database::detect_constraints`]
    users_unique: bool,
}

impl Database {
    /// Create a new database connection pool and open its first connections
    pub fn connect(settings: &config::Database) -> Result<Self> {
        let manager = PostgresConnectionManager::new(Self::client_config(settings), NoTls);
        let pool = Pool::builder()
            .max_size(settings.pool_size)
            .build(manager)
            .with_context(|| {
                format!(
                    "Failed to connect to PostgreSQL at {}:{}/{}",
                    settings.host, settings.port, settings.name
                )
            })?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool. Until [`Database::detect_constraints`] runs,
    /// registrations take the locked path that works without the unique index.
    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            pool,
            users_unique: false,
        }
    }

    /// Translate settings into a client config
    ///
    /// # Arguments
    /// * `settings` - Database section of the server settings
    pub(crate) fn client_config(settings: &config::Database) -> postgres::Config {
        let mut client_config = postgres::Config::new();
        client_config
            .host(&settings.host)
            .port(settings.port)
            .user(&settings.user)
            .dbname(&settings.name)
            .application_name(env!("CARGO_PKG_NAME"));
        if !settings.password.is_empty() {
            client_config.password(&settings.password);
        }
        client_config
    }

    /// Create any missing tables, constraints and indexes
    ///
    /// A unique index that existing duplicate rows prevent is skipped with a
    /// warning instead of failing startup.
    pub fn initialize(&self) -> Result<()> {
        let mut conn = self.connection()?;
        conn.batch_execute(SCHEMA)
            .context("Failed to initialize database schema")?;

        for index in UNIQUE_INDEXES {
            match conn.batch_execute(&index.create_sql()) {
                Ok(()) => {}
                Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                    tracing::warn!(
                        "Skipping unique index {}: {} already holds duplicate ({}) rows",
                        index.name,
                        index.table,
                        index.columns.join(", ")
                    );
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create unique index {}", index.name))
                }
            }
        }
        Ok(())
    }

    /// Check which uniqueness rules the live schema actually enforces
    ///
    /// Without the `(email, type)` index, registration falls back to a locked
    /// check-then-insert. A missing friends index only means repeated requests
    /// are stored as separate edges.
    pub fn detect_constraints(&mut self) -> Result<()> {
        self.users_unique = self.has_unique_index(&USERS_EMAIL_TYPE)?;
        if !self.users_unique {
            tracing::warn!(
                "No unique index on users (email, type); registrations will use advisory locks"
            );
        }

        for index in UNIQUE_INDEXES.iter().filter(|i| i.table != USERS_EMAIL_TYPE.table) {
            if !self.has_unique_index(index)? {
                tracing::warn!(
                    "No unique index on {} ({}); duplicates will not be rejected",
                    index.table,
                    index.columns.join(", ")
                );
            }
        }
        Ok(())
    }

    pub fn users_unique(&self) -> bool {
        self.users_unique
    }

    fn has_unique_index(&self, index: &UniqueIndex) -> Result<bool> {
        let mut columns: Vec<&str> = index.columns.to_vec();
        columns.sort_unstable();

        let mut conn = self.connection()?;
        let row = conn
            .query_one(HAS_UNIQUE_INDEX, &[&index.table, &columns])
            .with_context(|| format!("Failed to inspect indexes on {}", index.table))?;
        Ok(row.try_get(0)?)
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    fn ideas(&self) -> IdeaRepository {
        IdeaRepository::new(self.pool.clone())
    }

    fn friends(&self) -> FriendRepository {
        FriendRepository::new(self.pool.clone())
    }
}

impl DatabaseOperations for Database {
    fn list_ideas(&self) -> DbResult<Vec<Idea>> {
        self.ideas().list_all()
    }

    fn ideas_by_user(&self, user_id: i32) -> DbResult<Vec<Idea>> {
        self.ideas().get_by_user(user_id)
    }

    fn create_idea(&self, user_id: i32, title: &str, content: &str) -> DbResult<Idea> {
        self.ideas().create(user_id, title, content)
    }

    fn create_user(&self, user: &NewUser) -> DbResult<User> {
        if self.users_unique {
            self.users().create(user)
        } else {
            self.users().create_locked(user)
        }
    }

    fn find_user_by_email(&self, email: &str, user_type: Option<&str>) -> DbResult<Option<User>> {
        let users = self.users();
        match user_type {
            Some(user_type) => users.get_by_email_and_type(email, user_type),
            None => users.get_by_email(email),
        }
    }

    fn send_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Friendship> {
        self.friends().send_request(user1_id, user2_id)
    }

    fn accept_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        self.friends().accept_request(user1_id, user2_id)
    }

    fn reject_request(&self, user1_id: i32, user2_id: i32) -> DbResult<Option<Friendship>> {
        self.friends().reject_request(user1_id, user2_id)
    }

    fn friends_of(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.friends().get_friends(user_id)
    }

    fn pending_sent(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.friends().get_pending_sent(user_id)
    }

    fn pending_received(&self, user_id: i32) -> DbResult<Vec<Friendship>> {
        self.friends().get_pending_received(user_id)
    }
}
