use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    audit::{client_ip, AuditEvent},
    auth::{
        dto::{
            LoginRequest, LoginResponse, MeResponse, ProfileView, RegisterRequest,
            RegisterResponse,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::{Language, User, UserRole},
    },
    error::ApiError,
    extract::ApiJson,
    patients::repo::PatientProfile,
    state::AppState,
    therapists::repo::TherapistProfile,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("Missing required field: {name}")))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = required(payload.email, "email")?.trim().to_lowercase();
    let password = required(payload.password, "password")?;
    let role_raw = required(payload.role, "role")?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    let role: UserRole = role_raw.parse().map_err(|_| {
        ApiError::Validation("Invalid role. Must be 'therapist' or 'patient'".into())
    })?;

    let language = match payload.language_preference.as_deref() {
        Some(code) => code
            .parse::<Language>()
            .map_err(|_| ApiError::Validation("Invalid language. Must be one of he, ar, en".into()))?,
        None => Language::default(),
    };

    // Fast-path duplicate check. The unique index on users.email is the real
    // guard; a concurrent insert still comes back as 23505 -> Conflict.
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict(
            "User with this email already exists".into(),
        ));
    }

    let hash = hash_password(&password)?;

    let user = User::create(
        &state.db,
        &email,
        &hash,
        role,
        language,
        payload.phone_number.as_deref(),
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    state
        .audit
        .record(
            AuditEvent::info(format!(
                "New user registered: {} with role {}",
                user.email, role_raw
            ))
            .user(user.id)
            .endpoint("/api/auth/register")
            .source_ip(client_ip(&headers)),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            (e.trim().to_lowercase(), p)
        }
        _ => {
            return Err(ApiError::Validation(
                "Email and password are required".into(),
            ))
        }
    };

    // Unknown email and bad password produce the same error shape so the
    // response cannot be used to enumerate accounts.
    let invalid = || ApiError::Auth("Invalid email or password".into());

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(invalid());
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    // Checked only after the hash verifies, so a disabled account is not
    // distinguishable from a wrong password any faster.
    if !user.is_active {
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::Auth("Account is deactivated".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    state
        .audit
        .record(
            AuditEvent::info(format!("User logged in: {}", user.email))
                .user(user.id)
                .endpoint("/api/auth/login")
                .source_ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        access_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    let profile = match user.role {
        UserRole::Therapist => TherapistProfile::find_by_user(&state.db, user.id)
            .await?
            .map(ProfileView::Therapist),
        UserRole::Patient => PatientProfile::find_by_user(&state.db, user.id)
            .await?
            .map(ProfileView::Patient),
    };

    Ok(Json(MeResponse {
        user: user.into(),
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@clinic.example.org"));
    }

    #[test]
    fn email_validation_rejects_junk() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@nodot"));
    }

    #[test]
    fn required_names_the_missing_field() {
        let err = required(None, "role").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("role"));

        let err = required(Some("   ".into()), "email").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assert_eq!(required(Some("pw123456".into()), "password").unwrap(), "pw123456");
    }
}
