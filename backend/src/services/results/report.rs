use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::info;

use crate::config::Config;
use crate::report;
use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

/// Renders the PDF report for the categorized batch and returns it for
/// download. Repeatable; each call re-renders with a fresh timestamp.
pub async fn process(
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to export the report");
    }
    let Some(buckets) = workflow.buckets_snapshot().await else {
        return HttpResponse::Conflict().body("No categorized batch to report on");
    };

    match report::render_report(&buckets, Utc::now(), &config.assets_dir).await {
        Ok(bytes) => {
            workflow.mark_exported().await;
            info!("exported report for {} file(s)", buckets.len());
            HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header((
                    "Content-Disposition",
                    "attachment; filename=\"neurotriage_report.pdf\"",
                ))
                .body(bytes)
        }
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("PDF generation failed: {}", e)),
    }
}
