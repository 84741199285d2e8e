use crate::domain::model::{ResultSet, SqlValue, Statement};
use crate::domain::ports::DataStore;
use crate::utils::error::{Result, ShopError};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use rusqlite::{Transaction, TransactionBehavior};
use std::time::Duration;

/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Customer (
    id INTEGER PRIMARY KEY,
    fname TEXT NOT NULL,
    lname TEXT NOT NULL,
    phone TEXT NOT NULL,
    address TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Mechanic (
    id INTEGER PRIMARY KEY,
    fname TEXT NOT NULL,
    lname TEXT NOT NULL,
    experience INTEGER NOT NULL CHECK (experience >= 0)
);

CREATE TABLE IF NOT EXISTS Car (
    vin TEXT PRIMARY KEY,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL CHECK (year >= 1970)
);

CREATE TABLE IF NOT EXISTS Owns (
    ownership_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES Customer(id),
    car_vin TEXT NOT NULL REFERENCES Car(vin)
);

CREATE TABLE IF NOT EXISTS Service_Request (
    rid INTEGER PRIMARY KEY,
    customer_id INTEGER NOT NULL REFERENCES Customer(id),
    car_vin TEXT NOT NULL REFERENCES Car(vin),
    date TEXT NOT NULL,
    odometer INTEGER NOT NULL CHECK (odometer > 0),
    complain TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Closed_Request (
    wid INTEGER PRIMARY KEY AUTOINCREMENT,
    rid INTEGER NOT NULL UNIQUE REFERENCES Service_Request(rid),
    mid INTEGER NOT NULL REFERENCES Mechanic(id),
    date TEXT NOT NULL,
    comment TEXT NOT NULL,
    bill INTEGER NOT NULL CHECK (bill >= 0)
);
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub busy_timeout: Duration,
    pub create_schema: bool,
    /// Open an existing database without write access. A missing file is an error.
    pub read_only: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            create_schema: true,
            read_only: false,
        }
    }
}

impl StoreOptions {
    /// Options for report-only access: no file creation, no schema changes.
    pub fn read_only() -> Self {
        Self {
            create_schema: false,
            read_only: true,
            ..Self::default()
        }
    }
}

/// The shop database: one SQLite connection held for the life of the value.
/// Dropping the store closes the connection.
pub struct SqliteStore {
    conn: Connection,
    location: String,
}

impl SqliteStore {
    pub fn open(path: &str, options: &StoreOptions) -> Result<Self> {
        let connection_error = |source| ShopError::ConnectionError {
            location: path.to_string(),
            source,
        };

        let access = if options.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        };
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(connection_error)?;
        Self::configure(&conn, options).map_err(connection_error)?;

        let store = Self {
            conn,
            location: path.to_string(),
        };
        if options.create_schema && !options.read_only {
            store.ensure_schema()?;
        }

        tracing::info!(
            location = %store.location,
            read_only = options.read_only,
            "🔌 connected to database"
        );
        Ok(store)
    }

    /// Fresh private database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:", &StoreOptions::default())
    }

    fn configure(conn: &Connection, options: &StoreOptions) -> rusqlite::Result<()> {
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        // 確認檔案真的是可讀的資料庫
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(())
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        tracing::debug!(location = %self.location, "schema ensured");
        Ok(())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Closes the connection, reporting any error the drop path would swallow.
    pub fn close(self) -> Result<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, e)| ShopError::StoreError(e))?;
        tracing::info!(%location, "database connection closed");
        Ok(())
    }
}

fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
        SqlValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
    }
}

fn to_display(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl DataStore for SqliteStore {
    fn execute(&self, statement: &Statement) -> Result<usize> {
        let affected = self.conn.execute(
            &statement.sql,
            params_from_iter(statement.params.iter().map(to_value)),
        )?;
        Ok(affected)
    }

    fn count(&self, statement: &Statement) -> Result<usize> {
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.params.iter().map(to_value)))?;
        let mut count = 0;
        while rows.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn query(&self, statement: &Statement) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params_from_iter(statement.params.iter().map(to_value)))?;
        let mut result = ResultSet {
            columns,
            rows: Vec::new(),
        };
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(result.columns.len());
            for idx in 0..result.columns.len() {
                record.push(to_display(row.get_ref(idx)?));
            }
            result.rows.push(record);
        }
        Ok(result)
    }

    fn current_sequence_value(&self, sequence: &str) -> Result<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = ?1 COLLATE NOCASE",
                params![sequence],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn atomically<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        // IMMEDIATE 先取得寫鎖，多個操作員同時寫入時在此排隊
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = work(self)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_query_returns_columns_and_stringified_values() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute(
                &Statement::new("INSERT INTO Car (vin, make, model, year) VALUES (?1, ?2, ?3, ?4)")
                    .bind("1HGCM82633A0043")
                    .bind("Honda")
                    .bind("Accord")
                    .bind(2003i64),
            )
            .unwrap();

        let rows = store
            .query(&Statement::new("SELECT vin, year, NULL AS note FROM Car"))
            .unwrap();
        assert_eq!(rows.columns, vec!["vin", "year", "note"]);
        assert_eq!(
            rows.rows,
            vec![vec![
                "1HGCM82633A0043".to_string(),
                "2003".to_string(),
                "NULL".to_string()
            ]]
        );
    }

    #[test]
    fn test_atomically_rolls_back_on_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result: Result<()> = store.atomically(|s| {
            s.execute(
                &Statement::new("INSERT INTO Mechanic (id, fname, lname, experience) VALUES (1, 'A', 'B', 3)"),
            )?;
            Err(ShopError::ProcessingError {
                message: "abort".to_string(),
            })
        });
        assert!(result.is_err());

        let count = store
            .count(&Statement::new("SELECT id FROM Mechanic"))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sequence_value_tracks_autoincrement() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.current_sequence_value("Owns").unwrap(), None);

        store
            .execute(&Statement::new(
                "INSERT INTO Customer (id, fname, lname, phone, address) VALUES (1, 'a', 'b', '1', 'x')",
            ))
            .unwrap();
        store
            .execute(&Statement::new(
                "INSERT INTO Car (vin, make, model, year) VALUES ('V1', 'm', 'm', 2000)",
            ))
            .unwrap();
        store
            .execute(&Statement::new(
                "INSERT INTO Owns (customer_id, car_vin) VALUES (1, 'V1')",
            ))
            .unwrap();

        assert_eq!(store.current_sequence_value("owns").unwrap(), Some(1));
    }

    #[test]
    fn test_open_reports_connection_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir").join("shop.db");

        let err = SqliteStore::open(missing.to_str().unwrap(), &StoreOptions::default())
            .err()
            .expect("opening inside a missing directory must fail");
        assert!(matches!(err, ShopError::ConnectionError { .. }));
    }

    #[test]
    fn test_file_store_persists_between_connections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shop.db");
        let path = path.to_str().unwrap();

        let store = SqliteStore::open(path, &StoreOptions::default()).unwrap();
        store
            .execute(&Statement::new(
                "INSERT INTO Mechanic (id, fname, lname, experience) VALUES (4, 'Kim', 'Lee', 9)",
            ))
            .unwrap();
        store.close().unwrap();

        let reopened = SqliteStore::open(path, &StoreOptions::default()).unwrap();
        let rows = reopened
            .query(&Statement::new("SELECT fname FROM Mechanic WHERE id = 4"))
            .unwrap();
        assert_eq!(rows.value(0, "fname"), Some("Kim"));
    }

    #[test]
    fn test_read_only_open_does_not_create_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let typo = temp_dir.path().join("typo.db");

        let err = SqliteStore::open(typo.to_str().unwrap(), &StoreOptions::read_only())
            .err()
            .expect("read-only open of a missing file must fail");
        assert!(matches!(err, ShopError::ConnectionError { .. }));
        assert!(!typo.exists());
    }

    #[test]
    fn test_read_only_store_reads_but_rejects_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shop.db");
        let path = path.to_str().unwrap();

        let writer = SqliteStore::open(path, &StoreOptions::default()).unwrap();
        writer
            .execute(&Statement::new(
                "INSERT INTO Mechanic (id, fname, lname, experience) VALUES (2, 'Jo', 'Park', 1)",
            ))
            .unwrap();
        writer.close().unwrap();

        let reader = SqliteStore::open(path, &StoreOptions::read_only()).unwrap();
        assert_eq!(
            reader
                .count(&Statement::new("SELECT id FROM Mechanic"))
                .unwrap(),
            1
        );
        let write = reader.execute(&Statement::new("DELETE FROM Mechanic"));
        assert!(matches!(write, Err(ShopError::StoreError(_))));
    }
}
