/// Database row types — these map directly to SQLite rows.
/// Distinct from sealnote-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct RecordRow {
    pub id: String,
    pub owner_id: String,
    pub plaintext: String,
    pub ciphertext: String,
    pub last_decoded: Option<String>,
    pub created_at: String,
}
