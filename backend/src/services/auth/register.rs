use actix_web::{web, HttpResponse, Responder};
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::Utc;
use common::model::account::UserAccount;
use common::requests::RegisterRequest;
use log::info;
use regex::Regex;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AuthError, FieldError};
use crate::session::store;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MIN_PASSWORD_CHARS: usize = 6;

pub async fn process(
    config: web::Data<Config>,
    payload: web::Json<RegisterRequest>,
) -> impl Responder {
    match register(&config, payload.into_inner()) {
        Ok(account) => {
            HttpResponse::Created().body(format!("Account created for {}", account.email))
        }
        Err(AuthError::Validation(fields)) => HttpResponse::BadRequest().json(fields),
        Err(AuthError::DuplicateEmail) => HttpResponse::Conflict().json(vec![FieldError::new(
            "email",
            "An account with this email already exists",
        )]),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error creating account: {}", e))
        }
    }
}

/// Validates the sign-up form, hashes the password, and stores the new
/// account. The email is case-normalized before the duplicate check so
/// addresses differing only in case collide.
pub fn register(config: &Config, req: RegisterRequest) -> Result<UserAccount, AuthError> {
    validate(&req)?;

    let email = req.email.trim().to_lowercase();
    if store::find_user_by_email(&config.db_path, &email)?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .to_string();

    let account = UserAccount {
        id: Uuid::new_v4().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email,
        password_hash,
        institution: req.institution.trim().to_string(),
        created_at: Utc::now(),
    };
    store::insert_user(&config.db_path, &account)?;
    info!("registered account {}", account.email);
    Ok(account)
}

/// Checks every field and reports all failures together rather than
/// stopping at the first.
fn validate(req: &RegisterRequest) -> Result<(), AuthError> {
    let email_re =
        Regex::new(EMAIL_PATTERN).map_err(|e| AuthError::Internal(format!("regex error: {}", e)))?;
    let mut errors = Vec::new();

    if req.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email_re.is_match(req.email.trim()) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }

    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if req.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if req.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "First name is required"));
    }
    if req.last_name.trim().is_empty() {
        errors.push(FieldError::new("last_name", "Last name is required"));
    }
    if req.institution.trim().is_empty() {
        errors.push(FieldError::new("institution", "Institution is required"));
    }

    if req.confirm_password.is_empty() {
        errors.push(FieldError::new(
            "confirm_password",
            "Please confirm your password",
        ));
    } else if req.confirm_password != req.password {
        errors.push(FieldError::new("confirm_password", "Passwords do not match"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StrategyKind;
    use tempfile::TempDir;

    pub(crate) fn test_config(dir: &TempDir) -> Config {
        let db_path = dir.path().join("store.sqlite");
        store::init_db(&db_path).unwrap();
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            db_path,
            spool_dir: dir.path().join("uploads"),
            assets_dir: dir.path().join("assets"),
            strategy: StrategyKind::Lookup,
            stage_delay_ms: 1,
            classify_delay_ms: 1,
        }
    }

    pub(crate) fn signup(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            institution: "Analytical Engine Clinic".to_string(),
        }
    }

    #[test]
    fn registers_and_normalizes_the_email() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let account = register(&config, signup("Ada@Example.ORG")).unwrap();
        assert_eq!(account.email, "ada@example.org");
        assert_ne!(account.password_hash, "hunter22");
    }

    #[test]
    fn duplicate_email_differs_only_in_case() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        register(&config, signup("ada@example.org")).unwrap();
        let err = register(&config, signup("ADA@EXAMPLE.ORG")).unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[test]
    fn validation_collects_every_failing_field() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let req = RegisterRequest {
            first_name: "".to_string(),
            last_name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "shrt".to_string(),
            confirm_password: "different".to_string(),
            institution: "".to_string(),
        };
        let err = register(&config, req).unwrap_err();
        let AuthError::Validation(fields) = err else {
            panic!("expected a validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            names,
            [
                "email",
                "password",
                "first_name",
                "last_name",
                "institution",
                "confirm_password"
            ]
        );
    }
}
