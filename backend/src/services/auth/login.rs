use actix_web::{web, HttpResponse, Responder};
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use common::model::account::Session;
use common::requests::LoginRequest;
use log::{info, warn};

use crate::config::Config;
use crate::error::AuthError;
use crate::session::{store, SessionState};

pub async fn process(
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    match authenticate(&config, &req.email, &req.password) {
        Ok(session) => {
            if let Err(e) = store::persist_session(&config.db_path, &session) {
                warn!("could not persist session: {}", e);
            }
            info!("signed in {}", session.email);
            // Observers hear about the new session before we respond.
            sessions.sign_in(session.clone()).await;
            HttpResponse::Ok().json(session)
        }
        Err(AuthError::InvalidCredentials) => HttpResponse::Unauthorized()
            .body("Invalid email or password. Please check your credentials and try again."),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error signing in: {}", e)),
    }
}

/// Case-normalized email lookup plus hash verification. A missing account
/// and a wrong password collapse into the same error so the response never
/// reveals which one it was.
pub fn authenticate(config: &Config, email: &str, password: &str) -> Result<Session, AuthError> {
    let email = email.trim().to_lowercase();
    let account = store::find_user_by_email(&config.db_path, &email)?
        .ok_or(AuthError::InvalidCredentials)?;

    let parsed = PasswordHash::new(&account.password_hash)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(Session {
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        institution: account.institution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::register::tests::{signup, test_config};
    use crate::services::auth::register::register;
    use tempfile::TempDir;

    #[test]
    fn authenticates_registered_credentials() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        register(&config, signup("ada@example.org")).unwrap();

        let session = authenticate(&config, "Ada@Example.org", "hunter22").unwrap();
        assert_eq!(session.email, "ada@example.org");
        assert_eq!(session.first_name, "Ada");
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        register(&config, signup("ada@example.org")).unwrap();

        let err = authenticate(&config, "ada@example.org", "wrong-password").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn unknown_email_is_invalid_credentials() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let err = authenticate(&config, "nobody@example.org", "hunter22").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn failed_login_leaves_the_session_unset() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        register(&config, signup("ada@example.org")).unwrap();
        let sessions = SessionState::new();

        assert!(authenticate(&config, "ada@example.org", "wrong-password").is_err());
        assert!(sessions.current().await.is_none());
    }
}
