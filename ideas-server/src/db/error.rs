use postgres::error::SqlState;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Storage failures, classified so handlers can tell constraint hits from outages.
#[derive(Debug, Error)]
pub enum DbError {
    /// A unique or primary key constraint rejected the write.
    #[error("duplicate row: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("failed to get database connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("query failed: {0}")]
    Query(postgres::Error),

    #[error("unexpected column value: {0}")]
    Decode(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<postgres::Error> for DbError {
    fn from(err: postgres::Error) -> Self {
        let classified = err.as_db_error().and_then(|db| {
            let detail = db.constraint().unwrap_or(db.message()).to_string();
            if *db.code() == SqlState::UNIQUE_VIOLATION {
                Some(DbError::Conflict(detail))
            } else if *db.code() == SqlState::FOREIGN_KEY_VIOLATION {
                Some(DbError::MissingReference(detail))
            } else {
                None
            }
        });

        classified.unwrap_or_else(|| DbError::Query(err))
    }
}
