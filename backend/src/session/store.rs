//! SQLite-backed account directory and persisted session.
//!
//! The layout mirrors the browser-local store this service replaces: a
//! `users` table for the registered-user directory and a `session_kv` table
//! holding the signed-in identity under the historical key names
//! (`userLoggedIn`, `userEmail`, `userName`, `userLastName`,
//! `userInstitution`). There is no schema versioning; concurrent processes
//! sharing the file are last-write-wins.

use chrono::{DateTime, Utc};
use common::model::account::{Session, UserAccount};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

pub fn init_db(path: &Path) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            institution TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS session_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
}

pub fn insert_user(path: &Path, account: &UserAccount) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute(
        "INSERT INTO users (id, first_name, last_name, email, password_hash, institution, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            account.id,
            account.first_name,
            account.last_name,
            account.email,
            account.password_hash,
            account.institution,
            account.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Looks up an account by its case-normalized email.
pub fn find_user_by_email(path: &Path, email: &str) -> Result<Option<UserAccount>, rusqlite::Error> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, email, password_hash, institution, created_at
         FROM users WHERE email = ?1",
    )?;
    let mut rows = stmt.query_map(params![email], |row| {
        let created_at: String = row.get(6)?;
        Ok(UserAccount {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            institution: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    })?;
    match rows.next() {
        Some(account) => Ok(Some(account?)),
        None => Ok(None),
    }
}

/// Writes the signed-in identity so it survives a restart.
pub fn persist_session(path: &Path, session: &Session) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    let rows: [(&str, &str); 5] = [
        ("userLoggedIn", "true"),
        ("userEmail", &session.email),
        ("userName", &session.first_name),
        ("userLastName", &session.last_name),
        ("userInstitution", &session.institution),
    ];
    for (key, value) in rows {
        conn.execute(
            "INSERT OR REPLACE INTO session_kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }
    Ok(())
}

pub fn clear_session(path: &Path) -> Result<(), rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute("DELETE FROM session_kv", [])?;
    Ok(())
}

/// Reads back the persisted session, if a complete one exists.
pub fn load_session(path: &Path) -> Result<Option<Session>, rusqlite::Error> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare("SELECT key, value FROM session_kv")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut kv: HashMap<String, String> = HashMap::new();
    for row in rows {
        let (key, value) = row?;
        kv.insert(key, value);
    }
    if kv.get("userLoggedIn").map(String::as_str) != Some("true") {
        return Ok(None);
    }
    let (Some(email), Some(first_name), Some(last_name), Some(institution)) = (
        kv.remove("userEmail"),
        kv.remove("userName"),
        kv.remove("userLastName"),
        kv.remove("userInstitution"),
    ) else {
        return Ok(None);
    };
    Ok(Some(Session {
        email,
        first_name,
        last_name,
        institution,
    }))
}
