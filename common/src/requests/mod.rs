use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::file::{Approval, Category, Modality};

/// Metadata part of the multipart batch upload.
/// Must be sent before the file parts.
#[derive(Deserialize)]
pub struct BatchMeta {
    pub modality: Modality,
    /// Optional per-file last-modified timestamps as the client reports
    /// them, keyed by filename, epoch milliseconds.
    #[serde(default)]
    pub last_modified: HashMap<String, i64>,
}

/// Request payload for account sign-up. All fields are validated together
/// and every failure is reported, not just the first.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub institution: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Attaches or replaces the optional clinical note on one file of the
/// active batch.
#[derive(Deserialize)]
pub struct NoteRequest {
    pub file_id: Uuid,
    pub note: String,
}

/// Sets the clinician verdict on one classified file. Addressing a bucket
/// or file that no longer exists is a no-op.
#[derive(Deserialize)]
pub struct ApprovalRequest {
    pub bucket: Category,
    pub file_id: Uuid,
    pub approval: Approval,
}

/// Overrides the AI explanation on one classified file. Addressing a
/// bucket or file that no longer exists is a no-op.
#[derive(Deserialize)]
pub struct ExplanationRequest {
    pub bucket: Category,
    pub file_id: Uuid,
    pub explanation: String,
}
