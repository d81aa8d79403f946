use actix_web::{web, HttpResponse, Responder};

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Lists the active, not-yet-classified batch for the upload surface.
/// Serializes as `null` once classification has run or nothing is staged.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to view the batch");
    }
    HttpResponse::Ok().json(workflow.active_batch().await)
}
