//! Project persistence
//!
//! `db` holds the synchronous rusqlite statements; [`ProjectStore`] is the
//! async handle the web layer uses, running each statement on Tokio's
//! blocking pool so SQLite I/O never stalls async worker threads.

pub mod db;

use std::sync::Arc;

pub use db::{create_pool, get_connection, DbConnection, DbPool, ProjectContent, ProjectSummary};

use crate::error::{AppError, AppResult};

/// Async, cloneable handle over the project table.
///
/// Every operation is a single SQL statement; nothing spans two operations.
#[derive(Clone)]
pub struct ProjectStore {
    pool: Arc<DbPool>,
}

impl ProjectStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database file and returns a store over it.
    pub fn open(database_path: &str) -> AppResult<Self> {
        Ok(Self::new(Arc::new(create_pool(database_path)?)))
    }

    /// Runs a closure with a pooled connection on a blocking thread.
    async fn call<F, R>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&DbConnection) -> AppResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            let conn = get_connection(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| AppError::StorageUnavailable(format!("DB task failed: {}", e)))?
    }

    /// Inserts a new project and returns its id.
    pub async fn save(&self, owner_id: i64, title: &str, task: &str, code: &str) -> AppResult<i64> {
        let (title, task, code) = (title.to_string(), task.to_string(), code.to_string());
        let id = self
            .call(move |conn| db::save_project(conn, owner_id, &title, &task, &code))
            .await?;
        log::info!("Saved project {} for user {}", id, owner_id);
        Ok(id)
    }

    /// All of an owner's projects, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> AppResult<Vec<ProjectSummary>> {
        self.call(move |conn| db::list_projects(conn, owner_id)).await
    }

    /// Full content by id, without an ownership check.
    pub async fn fetch_by_id(&self, project_id: i64) -> AppResult<ProjectContent> {
        self.call(move |conn| db::get_project(conn, project_id)).await
    }

    /// Full content by id, visible only to its owner.
    pub async fn fetch_owned(&self, project_id: i64, owner_id: i64) -> AppResult<ProjectContent> {
        self.call(move |conn| db::get_owned_project(conn, project_id, owner_id))
            .await
    }

    /// Deletes when both id and owner match; a miss is a silent no-op.
    pub async fn delete_by_id_and_owner(&self, project_id: i64, owner_id: i64) -> AppResult<()> {
        let removed = self
            .call(move |conn| db::delete_project(conn, project_id, owner_id))
            .await?;
        if removed {
            log::info!("Deleted project {} of user {}", project_id, owner_id);
        } else {
            log::debug!("Delete of project {} by user {} matched nothing", project_id, owner_id);
        }
        Ok(())
    }
}
