use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RecordStore, StoreError, StoreResult};
use crate::types::{NewRecord, Record, RecordUpdate};

const RECORD_COLUMNS: &str = "id, question, answer, link, video, picture, document";

/// Record storage using SQLite
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open or create a record store at the given path
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a throwaway store that lives only as long as the value
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> StoreResult<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                link TEXT,
                video TEXT,
                picture TEXT,
                document TEXT
            );
        "#,
        )?;
        Ok(())
    }

    // A panic while holding the lock leaves the connection itself usable.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_with(conn: &Connection, id: i64) -> StoreResult<Record> {
        conn.query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
            [id],
            record_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound(id))
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, record: &NewRecord) -> StoreResult<Record> {
        let conn = self.conn();
        conn.execute(
            r#"INSERT INTO records (question, answer, link, video, picture, document)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                record.question,
                record.answer,
                record.link,
                record.video,
                record.picture,
                record.document,
            ],
        )?;

        Ok(Record {
            id: conn.last_insert_rowid(),
            question: record.question.clone(),
            answer: record.answer.clone(),
            link: record.link.clone(),
            video: record.video.clone(),
            picture: record.picture.clone(),
            document: record.document.clone(),
        })
    }

    fn get(&self, id: i64) -> StoreResult<Record> {
        Self::get_with(&self.conn(), id)
    }

    fn search(&self, substring: &str) -> StoreResult<Vec<Record>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            r#"SELECT {RECORD_COLUMNS} FROM records
               WHERE lower(question) LIKE '%' || lower(?1) || '%' ESCAPE '\'
               ORDER BY id"#
        ))?;

        let results = stmt
            .query_map([escape_like(substring)], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    fn all(&self) -> StoreResult<Vec<Record>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records ORDER BY id"
        ))?;

        let results = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    fn update(&self, id: i64, update: &RecordUpdate) -> StoreResult<Record> {
        let conn = self.conn();
        let mut record = Self::get_with(&conn, id)?;
        update.apply(&mut record);

        conn.execute(
            r#"UPDATE records
               SET question = ?2, answer = ?3, link = ?4, video = ?5,
                   picture = ?6, document = ?7
               WHERE id = ?1"#,
            params![
                record.id,
                record.question,
                record.answer,
                record.link,
                record.video,
                record.picture,
                record.document,
            ],
        )?;

        Ok(record)
    }

    fn delete(&self, id: i64) -> StoreResult<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM records WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        link: row.get(3)?,
        video: row.get(4)?,
        picture: row.get(5)?,
        document: row.get(6)?,
    })
}

/// Escape LIKE wildcards so the query matches as a literal substring
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
