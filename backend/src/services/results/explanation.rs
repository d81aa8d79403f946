use actix_web::{web, HttpResponse, Responder};
use common::requests::ExplanationRequest;

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Overrides the AI explanation with the clinician's text. Same stale
/// reference contract as the approval route.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
    payload: web::Json<ExplanationRequest>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to review results");
    }
    let req = payload.into_inner();
    let applied = workflow
        .set_explanation(req.bucket, req.file_id, req.explanation)
        .await;
    HttpResponse::Ok().json(serde_json::json!({ "applied": applied }))
}
