/// SQL schema for the ideas database
/// Creates missing tables and plain indexes; safe to run on every start
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    type TEXT NOT NULL,
    email TEXT NOT NULL
);

-- Ideas table
CREATE TABLE IF NOT EXISTS ideas (
    id SERIAL PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    likes INTEGER NOT NULL DEFAULT 0,
    views INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_ideas_user_id ON ideas(user_id);

-- Friend requests; user1_id sent the request to user2_id
CREATE TABLE IF NOT EXISTS friends (
    user1_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    user2_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_friends_user2_id ON friends(user2_id);
"#;

/// A uniqueness rule the handlers rely on
///
/// Kept out of the table DDL so it can also be added to tables that already exist.
pub struct UniqueIndex {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl UniqueIndex {
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            self.name,
            self.table,
            self.columns.join(", ")
        )
    }
}

/// One account per (email, type); registration reports duplicates through it
pub const USERS_EMAIL_TYPE: UniqueIndex = UniqueIndex {
    name: "users_email_type_key",
    table: "users",
    columns: &["email", "type"],
};

/// One request per direction; a repeated send is a conflict
pub const FRIENDS_PAIR: UniqueIndex = UniqueIndex {
    name: "friends_user1_user2_key",
    table: "friends",
    columns: &["user1_id", "user2_id"],
};

pub const UNIQUE_INDEXES: &[UniqueIndex] = &[USERS_EMAIL_TYPE, FRIENDS_PAIR];

/// Is there a full-column unique index on `$1` covering exactly the columns in `$2`?
///
/// `$2` must be sorted by name.
pub const HAS_UNIQUE_INDEX: &str = r#"
SELECT EXISTS (
    SELECT 1
    FROM pg_index i
    WHERE i.indrelid = to_regclass($1::text)
      AND i.indisunique
      AND i.indpred IS NULL
      AND i.indexprs IS NULL
      AND (
          SELECT array_agg(a.attname::text ORDER BY a.attname::text)
          FROM pg_attribute a
          WHERE a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
      ) = $2::text[]
)
"#;
