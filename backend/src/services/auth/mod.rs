//! # Authentication Service Module
//!
//! Aggregates the account and session endpoints under `/api/auth`. The
//! account directory lives in SQLite (`session::store`); the signed-in
//! identity is process-wide state (`session::SessionState`) whose changes
//! are broadcast to interested observers before the triggering call
//! returns.
//!
//! ## Registered Routes:
//!
//! *   **`POST /register`**: creates an account. Every form field is
//!     validated and all failures are returned together; a duplicate email
//!     (case-insensitive) is rejected with a conflict.
//! *   **`POST /login`**: verifies credentials against the stored Argon2
//!     hash, installs the session, and persists it so a restart keeps the
//!     clinician signed in.
//! *   **`POST /logout`**: clears the session unconditionally. Idempotent.
//! *   **`GET /session`**: reports the current signed-in identity, used by
//!     header surfaces to resync.

mod login;
mod logout;
mod register;
mod session;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/auth";

/// Configures and returns the Actix scope for auth routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/register", post().to(register::process))
        .route("/login", post().to(login::process))
        .route("/logout", post().to(logout::process))
        .route("/session", get().to(session::process))
}
