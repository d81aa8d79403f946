//! # Results & Export Service
//!
//! Serves the classified buckets for review and the exported PDF report
//! under `/api/results`.
//!
//! ## Registered Routes:
//!
//! *   **`GET /`**: the three buckets in presentation order (ascending by
//!     the component number in the filename; unnumbered files first).
//! *   **`POST /approval`**: records the clinician verdict on one file.
//!     A stale bucket/file reference is ignored, not an error.
//! *   **`POST /explanation`**: overrides the AI explanation with the
//!     clinician's text. Same no-op contract.
//! *   **`GET /report`**: renders and returns the PDF report. Artifact
//!     failures are skipped per file; the report always completes.

mod approval;
mod explanation;
mod get;
mod report;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/results";

/// Configures and returns the Actix scope for results routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("/approval", post().to(approval::process))
        .route("/explanation", post().to(explanation::process))
        .route("/report", get().to(report::process))
}
