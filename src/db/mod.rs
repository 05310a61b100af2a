mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

const MEMORY_URI: &str = "sqlite::memory:";
const SQLITE_SCHEME: &str = "sqlite://";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Handle to the task store.
///
/// Created once at startup and handed to every request; clones share the
/// same underlying connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the store named by `uri` and verify it answers.
    ///
    /// Accepts `sqlite::memory:`, `sqlite://<path>` or a bare path.
    pub fn connect(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let db = if uri == MEMORY_URI {
            Self::open_memory()?
        } else {
            Self::open(parse_store_path(uri)?)?
        };

        db.ping()?;
        tracing::info!("Database connection successful");
        Ok(db)
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Connection(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(&path).map_err(connection_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(connection_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(connection_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    /// Liveness check against the store.
    pub fn ping(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| Error::Connection(format!("database is not responsive: {}", e)))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Connection("database lock poisoned".to_string()))
    }

    // ============================================================
    // Task operations
    // ============================================================

    /// All tasks of `owner`, most recently created first.
    pub fn list_tasks_by_owner(&self, owner: &str) -> Result<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, title, status, priority, due_date, created_at
             FROM tasks WHERE owner = ? ORDER BY created_at DESC, rowid DESC",
        )?;

        let tasks = stmt
            .query_map([owner], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner, title, status, priority, due_date, created_at
             FROM tasks WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(task_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Insert a new pending task. A blank title is rejected before the store
    /// is touched; duplicates are allowed.
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        input.validate()?;

        let conn = self.lock()?;
        let id = Uuid::new_v4();
        // stored with microsecond precision
        let now = Utc::now().trunc_subsecs(6);
        let owner = input.owner.trim().to_string();
        let title = input.title.trim().to_string();
        let status = TaskStatus::Pending;

        conn.execute(
            "INSERT INTO tasks (id, owner, title, status, priority, due_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &owner,
                &title,
                status.as_str(),
                input.priority.as_str(),
                input.due_date.format(DATE_FORMAT).to_string(),
                now.to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
        )?;

        Ok(Task {
            id,
            owner,
            title,
            status,
            priority: input.priority,
            due_date: Some(input.due_date),
            created_at: now,
        })
    }

    /// Partial update of title, status and priority. Unknown ids are a no-op.
    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<()> {
        if input.is_empty() {
            return Ok(());
        }

        let conn = self.lock()?;

        let mut updates = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = input.title {
            updates.push("title = ?");
            params.push(Box::new(title));
        }
        if let Some(status) = input.status {
            updates.push("status = ?");
            params.push(Box::new(status.as_str()));
        }
        if let Some(priority) = input.priority {
            updates.push("priority = ?");
            params.push(Box::new(priority.as_str()));
        }

        params.push(Box::new(id.to_string()));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_ref.as_slice())?;
        if rows == 0 {
            tracing::debug!("update of unknown task {} ignored", id);
        }

        Ok(())
    }

    /// Remove a task. Unknown ids are a no-op.
    pub fn delete_task(&self, id: Uuid) -> Result<()> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        if rows == 0 {
            tracing::debug!("delete of unknown task {} ignored", id);
        }
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn parse_store_path(uri: &str) -> Result<PathBuf> {
    if uri.is_empty() {
        return Err(Error::Connection("empty store URI".to_string()));
    }
    if let Some(path) = uri.strip_prefix(SQLITE_SCHEME) {
        if path.is_empty() {
            return Err(Error::Connection(format!("no path in store URI '{}'", uri)));
        }
        return Ok(Path::new(path).to_path_buf());
    }
    if uri.contains("://") {
        return Err(Error::Connection(format!("unsupported store URI '{}'", uri)));
    }
    Ok(PathBuf::from(uri))
}

fn connection_error(e: rusqlite::Error) -> Error {
    Error::Connection(e.to_string())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get::<_, String>(0)?),
        owner: row.get(1)?,
        title: row.get(2)?,
        status: TaskStatus::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        priority: row
            .get::<_, Option<String>>(4)?
            .and_then(|p| TaskPriority::from_str(&p))
            .unwrap_or_default(),
        due_date: row.get::<_, Option<String>>(5)?.and_then(parse_date),
        created_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_uri_forms() {
        assert_eq!(
            parse_store_path("sqlite:///var/lib/tasks.db").unwrap(),
            PathBuf::from("/var/lib/tasks.db")
        );
        assert_eq!(
            parse_store_path("data/tasks.db").unwrap(),
            PathBuf::from("data/tasks.db")
        );
        assert!(parse_store_path("mongodb://localhost:27017").is_err());
        assert!(parse_store_path("sqlite://").is_err());
        assert!(parse_store_path("").is_err());
    }

    #[test]
    fn connect_to_memory_store_answers_ping() {
        let db = Database::connect("sqlite::memory:").unwrap();
        db.ping().unwrap();
    }

    #[test]
    fn unparseable_due_date_reads_as_none() {
        assert_eq!(parse_date("not a date".to_string()), None);
        assert_eq!(
            parse_date("2024-06-01".to_string()),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }
}
