use chrono::Utc;
use r2d2::Pool;
use r2d2_postgres::{postgres::NoTls, PostgresConnectionManager};

use ideas_types::NewUser;

use super::repositories::UserRepository;
use super::Database;
use crate::config::Settings;

fn test_settings() -> Settings {
    dotenv::dotenv().ok();
    Settings::new().expect("Failed to load settings")
}

fn stamp() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Connect to the database described by `POSTGRES_*` and make sure the schema exists
pub fn postgres_test_db() -> Database {
    let settings = test_settings();
    let mut db = Database::connect(&settings.database).expect("Failed to connect to test database");
    db.initialize().expect("Failed to initialize schema");
    db.detect_constraints().expect("Failed to inspect schema");
    db
}

/// A throwaway Postgres schema holding tables created by someone else
///
/// Every pooled connection has its `search_path` pointed at the schema, so the
/// repositories see these tables instead of the shared ones. Dropped on `Drop`.
pub struct LegacySchema {
    name: String,
    settings: Settings,
}

impl LegacySchema {
    /// Create the schema and run `ddl` inside it
    pub fn create(ddl: &str) -> Self {
        let settings = test_settings();
        let name = format!("legacy_{}_{}", std::process::id(), stamp());

        let admin = Database::connect(&settings.database).expect("Failed to connect to test database");
        let mut conn = admin.connection().expect("Failed to get connection");
        conn.batch_execute(&format!("CREATE SCHEMA {name}; SET search_path TO {name}; {ddl}"))
            .expect("Failed to create legacy schema");

        Self { name, settings }
    }

    /// A database whose connections only see this schema
    pub fn database(&self) -> Database {
        let mut client_config = Database::client_config(&self.settings.database);
        client_config.options(&format!("-c search_path={}", self.name));
        let pool = Pool::builder()
            .max_size(2)
            .build(PostgresConnectionManager::new(client_config, NoTls))
            .expect("Failed to build legacy pool");
        Database::from_pool(pool)
    }
}

impl Drop for LegacySchema {
    fn drop(&mut self) {
        if let Ok(admin) = Database::connect(&self.settings.database) {
            if let Ok(mut conn) = admin.connection() {
                let _ = conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name));
            }
        }
    }
}

/// Insert a throwaway user with a unique email and return its id
pub fn seed_user(db: &Database, name: &str) -> i32 {
    UserRepository::new(db.pool.clone())
        .create(&NewUser {
            username: name.to_string(),
            password: "$2b$04$notarealhash".to_string(),
            user_type: "member".to_string(),
            email: format!("{name}-{}@example.com", stamp()),
        })
        .expect("Failed to seed user")
        .id
}
