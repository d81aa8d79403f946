use actix_web::{web, HttpResponse, Responder};

use crate::session::SessionState;

/// Reports the current signed-in identity for header surfaces to resync.
pub async fn process(sessions: web::Data<SessionState>) -> impl Responder {
    let session = sessions.current().await;
    HttpResponse::Ok().json(serde_json::json!({
        "logged_in": session.is_some(),
        "session": session,
    }))
}
