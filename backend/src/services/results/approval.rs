use actix_web::{web, HttpResponse, Responder};
use common::requests::ApprovalRequest;

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Records a clinician verdict on one classified file. Addressing a
/// bucket or file that no longer exists leaves state untouched and still
/// answers 200; the reference was stale, not wrong.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
    payload: web::Json<ApprovalRequest>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to review results");
    }
    let req = payload.into_inner();
    let applied = workflow.set_approval(req.bucket, req.file_id, req.approval).await;
    HttpResponse::Ok().json(serde_json::json!({ "applied": applied }))
}
