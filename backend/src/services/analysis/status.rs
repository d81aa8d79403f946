use actix_web::{web, HttpResponse, Responder};

use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

pub(crate) async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to view analysis status");
    }
    HttpResponse::Ok().json(workflow.status().await)
}
