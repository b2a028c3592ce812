use crate::Database;
use crate::models::{RecordRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, name: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, name, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, password, created_at FROM users ORDER BY created_at",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        password: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Records --

    /// Insert an encrypt-event record. `owner_id`, `plaintext` and
    /// `ciphertext` are immutable once written; only `last_decoded` may
    /// change later.
    pub fn create_record(
        &self,
        id: &str,
        owner_id: &str,
        plaintext: &str,
        ciphertext: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (id, owner_id, plaintext, ciphertext, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, owner_id, plaintext, ciphertext, created_at),
            )?;
            Ok(())
        })
    }

    pub fn get_record(&self, id: &str) -> Result<Option<RecordRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, plaintext, ciphertext, last_decoded, created_at
                 FROM records WHERE id = ?1",
            )?;

            let row = stmt.query_row([id], map_record_row).optional()?;
            Ok(row)
        })
    }

    /// Last-write-wins by construction: a single UPDATE, no read-modify-write.
    pub fn set_last_decoded(&self, id: &str, plaintext: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE records SET last_decoded = ?2 WHERE id = ?1",
                (id, plaintext),
            )?;
            Ok(())
        })
    }

    pub fn list_records_by_owner(&self, owner_id: &str, limit: u32) -> Result<Vec<RecordRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, plaintext, ciphertext, last_decoded, created_at
                 FROM records
                 WHERE owner_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![owner_id, limit], map_record_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, name, email, password, created_at FROM users WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_record_row(row: &rusqlite::Row<'_>) -> std::result::Result<RecordRow, rusqlite::Error> {
    Ok(RecordRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        plaintext: row.get(2)?,
        ciphertext: row.get(3)?,
        last_decoded: row.get(4)?,
        created_at: row.get(5)?,
    })
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
