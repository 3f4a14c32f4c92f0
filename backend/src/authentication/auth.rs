use crate::{
    app_error::AppError,
    app_state::SharedState,
    login_request::LoginRequest,
    login_response::LoginResponse,
    register_request::RegisterRequest,
    settings::Settings,
    user::User,
};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(user: &User, settings: &Settings) -> Result<String, AppError> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(i64::from(settings.jwt_expiration_in_minutes));

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn register(state: &SharedState, payload: RegisterRequest) -> Result<LoginResponse, AppError> {
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(AppError::invalid_input(errors));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(&payload.name, &payload.email, password_hash, Utc::now());
    state.data_context.create_user(&user)?;

    let token = create_token(&user, &state.settings)?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(LoginResponse { token, user: user.to_get_dto() })
}

pub fn login(state: &SharedState, payload: LoginRequest) -> Result<LoginResponse, AppError> {
    let invalid = || AppError::Authentication {
        code: "INVALID_CREDENTIALS",
        message: "Invalid credentials".to_string(),
    };

    let user = state
        .data_context
        .get_user_by_email(&payload.email)?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = create_token(&user, &state.settings)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse { token, user: user.to_get_dto() })
}

/// Resolves the bearer token to a [`User`] and stores it in request extensions.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing or invalid token"))?;

    let claims = verify_token(token, &state.settings.jwt_secret)
        .map_err(|_| AppError::unauthorized("Invalid token"))?;

    let user = state
        .data_context
        .get_user(claims.sub)?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
