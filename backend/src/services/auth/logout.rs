use actix_web::{web, HttpResponse, Responder};
use log::warn;

use crate::config::Config;
use crate::session::{store, SessionState};

/// Clears the session unconditionally. Signing out while already signed
/// out is not an error.
pub async fn process(
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
) -> impl Responder {
    if let Err(e) = store::clear_session(&config.db_path) {
        warn!("could not clear persisted session: {}", e);
    }
    sessions.sign_out().await;
    HttpResponse::Ok().body("Signed out")
}
