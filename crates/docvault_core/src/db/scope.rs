//! Connection scoping for read paths that may run inside a larger unit of work.
//!
//! A caller that orchestrates several related loads opens one connection and
//! passes `ConnectionScope::Reuse`; a one-off caller passes
//! `ConnectionScope::Open` and the connection lives exactly as long as the call.
//! Owned connections are read-only: they neither create nor migrate the file.

use super::{open_db_read_only, DbError};
use log::warn;
use rusqlite::Connection;
use std::path::Path;

/// Where an operation gets its SQLite connection from.
#[derive(Debug, Clone, Copy)]
pub enum ConnectionScope<'a> {
    /// Borrow a connection already opened (and migrated) by the caller.
    Reuse(&'a Connection),
    /// Open an existing database file read-only for this call and release it
    /// afterwards.
    Open(&'a Path),
}

impl ConnectionScope<'_> {
    /// Runs `f` against the scoped connection.
    ///
    /// For `Open`, the connection is closed before returning, also when `f`
    /// fails. A close failure is reported only when `f` itself succeeded.
    pub fn run<T, E>(self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        match self {
            Self::Reuse(conn) => f(conn),
            Self::Open(path) => {
                let conn = open_db_read_only(path)?;
                let result = f(&conn);
                match conn.close() {
                    Ok(()) => result,
                    Err((_, err)) => {
                        warn!(
                            "event=db_close module=db status=error error_code=db_close_failed error={}",
                            err
                        );
                        match result {
                            Ok(_) => Err(DbError::Sqlite(err).into()),
                            Err(inner) => Err(inner),
                        }
                    }
                }
            }
        }
    }

    /// Returns whether the call manages its own connection lifetime.
    pub fn owns_connection(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionScope;
    use crate::db::{open_db, open_db_in_memory, DbError};

    #[test]
    fn reuse_runs_against_borrowed_connection() {
        let conn = open_db_in_memory().unwrap();
        conn.execute("INSERT INTO document_types (Title) VALUES ('Memo');", [])
            .unwrap();

        let count: i64 = ConnectionScope::Reuse(&conn)
            .run(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM document_types WHERE Title = 'Memo';",
                    [],
                    |row| row.get(0),
                )
                .map_err(DbError::from)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(!ConnectionScope::Reuse(&conn).owns_connection());
    }

    #[test]
    fn open_scope_sees_committed_file_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.sqlite3");
        {
            let conn = open_db(&path).unwrap();
            conn.execute("INSERT INTO document_types (Title) VALUES ('Memo');", [])
                .unwrap();
        }

        let scope = ConnectionScope::Open(&path);
        assert!(scope.owns_connection());
        let titles: Vec<String> = scope
            .run(|conn| -> Result<Vec<String>, DbError> {
                let mut stmt = conn.prepare("SELECT Title FROM document_types ORDER BY ID;")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let titles = rows.collect::<Result<Vec<String>, _>>()?;
                Ok(titles)
            })
            .unwrap();
        assert_eq!(titles, vec!["Invoice", "Receipt", "Memo"]);
    }

    #[test]
    fn open_scope_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.sqlite3");
        drop(open_db(&path).unwrap());

        let result = ConnectionScope::Open(&path).run(|conn| {
            conn.execute("INSERT INTO document_types (Title) VALUES ('Memo');", [])
                .map_err(DbError::from)
        });
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }

    #[test]
    fn open_scope_does_not_create_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sqlite3");

        let result = ConnectionScope::Open(&path).run(|_| Ok::<_, DbError>(()));
        assert!(matches!(result, Err(DbError::Sqlite(_))));
        assert!(!path.exists());
    }
}
