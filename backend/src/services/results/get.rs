use actix_web::{web, HttpResponse, Responder};

use crate::classifier;
use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Returns the classified buckets in presentation order, or an unprocessed
/// marker while classification has not run yet.
pub async fn process(
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to view results");
    }
    match workflow.buckets_snapshot().await {
        Some(mut buckets) => {
            if let Err(e) = classifier::sort_for_display(&mut buckets) {
                return HttpResponse::InternalServerError()
                    .body(format!("Error ordering results: {}", e));
            }
            HttpResponse::Ok().json(serde_json::json!({
                "processed": true,
                "buckets": buckets,
            }))
        }
        None => HttpResponse::Ok().json(serde_json::json!({
            "processed": false,
            "buckets": common::model::file::Buckets::default(),
        })),
    }
}
