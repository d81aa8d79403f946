use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered clinician account from the user directory.
///
/// Accounts are created once at sign-up and never mutated afterwards. The
/// email is stored case-normalized (lowercase) and is unique across the
/// directory. The password is kept as a salted Argon2 hash string.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub institution: String,
    pub created_at: DateTime<Utc>,
}

/// The identity of the currently signed-in clinician.
///
/// At most one session exists per process; it is installed on a successful
/// credential match and destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub institution: String,
}
