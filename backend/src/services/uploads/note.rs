use actix_web::{web, HttpResponse, Responder};
use common::requests::NoteRequest;

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Attaches a clinical note to one file of the staged batch. An unknown
/// file id is reported as not applied, never as an error.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
    payload: web::Json<NoteRequest>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to annotate the batch");
    }
    let req = payload.into_inner();
    let applied = workflow.set_clinical_note(req.file_id, req.note).await;
    HttpResponse::Ok().json(serde_json::json!({ "applied": applied }))
}
