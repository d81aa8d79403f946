use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Discards the active batch, releases its spooled files, and cancels any
/// pending workflow timers. Idempotent.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to clear the batch");
    }
    workflow.clear().await;
    info!("batch cleared");
    HttpResponse::Ok().body("Batch cleared")
}
