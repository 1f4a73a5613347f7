use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Key-value store --

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_value(conn, key))
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            upsert_value(conn, key, value)?;
            Ok(())
        })
    }

    /// Read-modify-write of a single key inside one transaction. `f` receives
    /// the current value (if any) and returns the value to store, or `None` to
    /// leave the row untouched. Returns whatever `f` decided to write.
    pub fn update_value<F>(&self, key: &str, f: F) -> Result<Option<String>>
    where
        F: FnOnce(Option<String>) -> Result<Option<String>>,
    {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = query_value(&tx, key)?;
            let next = f(current)?;
            if let Some(value) = &next {
                upsert_value(&tx, key, value)?;
            }
            tx.commit()?;
            Ok(next)
        })
    }
}

fn query_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
    let value: Option<String> = stmt.query_row([key], |row| row.get(0)).optional()?;
    Ok(value)
}

fn upsert_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        (key, value),
    )?;
    Ok(())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
