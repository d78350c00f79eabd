use postgres::Row;

use ideas_types::Idea;

use crate::db::{DbPool, DbResult};

pub struct IdeaRepository {
    pool: DbPool,
}

impl IdeaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new idea with zeroed counters
    pub fn create(&self, user_id: i32, title: &str, content: &str) -> DbResult<Idea> {
        let mut conn = self.pool.get()?;
        let row = conn.query_one(
            "INSERT INTO ideas (user_id, title, content, likes, views)
             VALUES ($1, $2, $3, 0, 0)
             RETURNING id, user_id, title, content, likes, views",
            &[&user_id, &title, &content],
        )?;
        Ok(idea_from_row(&row)?)
    }

    /// Get every idea, oldest first
    pub fn list_all(&self) -> DbResult<Vec<Idea>> {
        let mut conn = self.pool.get()?;
        let rows = conn.query(
            "SELECT id, user_id, title, content, likes, views FROM ideas ORDER BY id ASC",
            &[],
        )?;
        Ok(rows.iter().map(idea_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    /// Get ideas posted by a specific user
    pub fn get_by_user(&self, user_id: i32) -> DbResult<Vec<Idea>> {
        let mut conn = self.pool.get()?;
        let rows = conn.query(
            "SELECT id, user_id, title, content, likes, views
             FROM ideas
             WHERE user_id = $1
             ORDER BY id ASC",
            &[&user_id],
        )?;
        Ok(rows.iter().map(idea_from_row).collect::<Result<Vec<_>, _>>()?)
    }
}

fn idea_from_row(row: &Row) -> Result<Idea, postgres::Error> {
    Ok(Idea {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        likes: row.try_get("likes")?,
        views: row.try_get("views")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{postgres_test_db, seed_user};
    use crate::db::DbError;

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_create_and_list_ideas() {
        let db = postgres_test_db();
        let user_id = seed_user(&db, "ideas");
        let repo = IdeaRepository::new(db.pool.clone());

        let first = repo.create(user_id, "First", "one").unwrap();
        let second = repo.create(user_id, "Second", "two").unwrap();
        assert_eq!((first.likes, first.views), (0, 0));
        assert!(second.id > first.id);

        let mine = repo.get_by_user(user_id).unwrap();
        assert_eq!(mine, vec![first, second]);

        let all = repo.list_all().unwrap();
        assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[test]
    #[ignore = "requires a running PostgreSQL (POSTGRES_* env vars)"]
    fn test_create_for_unknown_user_is_missing_reference() {
        let db = postgres_test_db();
        let repo = IdeaRepository::new(db.pool.clone());

        let err = repo.create(i32::MAX, "T", "C").unwrap_err();
        assert!(matches!(err, DbError::MissingReference(_)), "got {err:?}");
    }
}
