//! # Batch Upload Service
//!
//! Handles intake of the active batch under `/api/uploads`. A batch is the
//! unit of work: selecting a new one replaces the previous one wholesale,
//! there is no append. Uploaded bytes are spooled to disk per batch and
//! released when the batch is cleared or replaced.
//!
//! The provided routes are:
//! - `POST /api/uploads/batch`: multipart upload of a new batch. Expects a
//!   `json` field with the batch metadata (modality, optional per-file
//!   last-modified map) followed by the `file` fields. Ingestion installs
//!   the batch and automatically schedules the staged advance through
//!   classification.
//! - `GET /api/uploads/batch`: lists the active, not-yet-classified batch.
//! - `POST /api/uploads/clear`: discards the batch and its spooled files.
//! - `POST /api/uploads/note`: attaches a clinical note to one file.

mod clear;
mod get;
mod ingest;
mod note;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/uploads";

/// Configures and returns the Actix scope for upload routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/batch", post().to(ingest::process))
        .route("/batch", get().to(get::process))
        .route("/clear", post().to(clear::process))
        .route("/note", post().to(note::process))
}
