use std::sync::Arc;

use crate::api::{ApiError, ApiResult};
use crate::db::DatabaseOperations;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseOperations>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseOperations>, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Run a storage operation (and anything else that blocks) off the async runtime
    pub async fn run_blocking<T, F>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce(&dyn DatabaseOperations) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(db.as_ref()))
            .await
            .map_err(|e| ApiError::InternalError(format!("Blocking task failed: {}", e)))?
    }
}
