use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Title stored when the caller supplies a blank one
pub const DEFAULT_TITLE: &str = "Untitled";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Listing entry: id and title only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub title: String,
}

/// Full content of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectContent {
    pub title: String,
    pub task: String,
    pub code: String,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        task TEXT NOT NULL,
        code TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_projects_user_created ON projects(user_id, created_at);
";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and makes sure the
/// `projects` table exists.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use codecore::store;
///
/// let pool = store::create_pool("db.sqlite")?;
/// # Ok::<(), codecore::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager =
        SqliteConnectionManager::file(database_path).with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;
    log::info!("Project store ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

fn init_schema(conn: &rusqlite::Connection) -> AppResult<()> {
    // WAL lets readers proceed while a save is being written
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Blank titles are replaced; any other title is stored exactly as given.
fn stored_title(title: &str) -> &str {
    if title.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        title
    }
}

/// Saves a new project and returns its id.
///
/// Never deduplicates: saving the same content twice creates two rows.
pub fn save_project(conn: &DbConnection, owner_id: i64, title: &str, task: &str, code: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO projects (user_id, title, task, code) VALUES (?1, ?2, ?3, ?4)",
        params![owner_id, stored_title(title), task, code],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists an owner's projects, newest first.
///
/// `created_at` has one-second resolution, so the id breaks ties.
pub fn list_projects(conn: &DbConnection, owner_id: i64) -> AppResult<Vec<ProjectSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, title FROM projects
         WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(ProjectSummary {
            id: row.get(0)?,
            title: row.get(1)?,
        })
    })?;

    let mut projects = Vec::new();
    for row in rows {
        projects.push(row?);
    }
    Ok(projects)
}

/// Fetches a project's content by id, regardless of owner.
pub fn get_project(conn: &DbConnection, project_id: i64) -> AppResult<ProjectContent> {
    conn.query_row(
        "SELECT title, task, code FROM projects WHERE id = ?1",
        params![project_id],
        |row| {
            Ok(ProjectContent {
                title: row.get(0)?,
                task: row.get(1)?,
                code: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound(project_id))
}

/// Fetches a project's content only if it belongs to `owner_id`.
///
/// A project owned by someone else is reported as `NotFound`, same as a
/// missing one.
pub fn get_owned_project(conn: &DbConnection, project_id: i64, owner_id: i64) -> AppResult<ProjectContent> {
    conn.query_row(
        "SELECT title, task, code FROM projects WHERE id = ?1 AND user_id = ?2",
        params![project_id, owner_id],
        |row| {
            Ok(ProjectContent {
                title: row.get(0)?,
                task: row.get(1)?,
                code: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound(project_id))
}

/// Deletes a project if both id and owner match.
///
/// Returns whether a row was removed; a miss is not an error.
pub fn delete_project(conn: &DbConnection, project_id: i64, owner_id: i64) -> AppResult<bool> {
    let removed = conn.execute(
        "DELETE FROM projects WHERE id = ?1 AND user_id = ?2",
        params![project_id, owner_id],
    )?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn test_pool() -> (TempDir, DbPool) {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("projects.sqlite");
        let pool = create_pool(path.to_str().expect("utf-8 path")).expect("pool");
        (dir, pool)
    }

    #[test]
    fn test_create_pool_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twice.sqlite");
        let path = path.to_str().unwrap();

        let first = create_pool(path).unwrap();
        let id = save_project(&get_connection(&first).unwrap(), 1, "a", "t", "c").unwrap();
        drop(first);

        let second = create_pool(path).unwrap();
        let conn = get_connection(&second).unwrap();
        assert_eq!(get_project(&conn, id).unwrap().title, "a");
    }

    #[test]
    fn test_blank_title_becomes_untitled() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let id = save_project(&conn, 5, "   ", "task", "code").unwrap();
        assert_eq!(get_project(&conn, id).unwrap().title, DEFAULT_TITLE);

        let id = save_project(&conn, 5, "", "task", "code").unwrap();
        assert_eq!(get_project(&conn, id).unwrap().title, DEFAULT_TITLE);

        let id = save_project(&conn, 5, "  calc  ", "task", "code").unwrap();
        assert_eq!(get_project(&conn, id).unwrap().title, "  calc  ");
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let first = save_project(&conn, 1, "a", "t", "c").unwrap();
        let second = save_project(&conn, 1, "b", "t", "c").unwrap();
        assert!(second > first);

        assert!(delete_project(&conn, second, 1).unwrap());
        let third = save_project(&conn, 1, "c", "t", "c").unwrap();
        assert!(third > second);
    }

    #[test]
    fn test_list_is_newest_first_and_scoped() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let older = save_project(&conn, 42, "older", "t", "c").unwrap();
        save_project(&conn, 7, "someone else", "t", "c").unwrap();
        let newer = save_project(&conn, 42, "newer", "t", "c").unwrap();

        let listed = list_projects(&conn, 42).unwrap();
        assert_eq!(
            listed,
            vec![
                ProjectSummary {
                    id: newer,
                    title: "newer".into()
                },
                ProjectSummary {
                    id: older,
                    title: "older".into()
                },
            ]
        );
        assert!(list_projects(&conn, 1000).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_saves_create_distinct_rows() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let a = save_project(&conn, 3, "same", "same", "same").unwrap();
        let b = save_project(&conn, 3, "same", "same", "same").unwrap();
        assert_ne!(a, b);
        assert_eq!(list_projects(&conn, 3).unwrap().len(), 2);
    }

    #[test]
    fn test_owned_fetch_hides_other_owners() {
        let (_dir, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        let id = save_project(&conn, 42, "calc", "task", "code").unwrap();
        assert_eq!(get_owned_project(&conn, id, 42).unwrap().title, "calc");
        assert!(matches!(get_owned_project(&conn, id, 43), Err(AppError::NotFound(n)) if n == id));
        assert!(get_project(&conn, id).is_ok());
    }
}
