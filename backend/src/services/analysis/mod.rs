//! # Analysis Status Service
//!
//! The processing surface polls `GET /api/analysis/status` while the
//! workflow advances on its own timers, the same way long-running job
//! status is polled elsewhere. There is no start endpoint: ingesting a
//! batch schedules the advance automatically.

mod status;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/analysis";

/// Configures and returns the Actix scope for analysis routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/status", get().to(status::process))
}
