use crate::{
    auth::{LoginRequest, PasswordHasher, RegisterRequest, TokenIssuer, TokenResponse},
    error::AppError,
    store::UserStore,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user.
///
/// Hashes the password and inserts the record. Uniqueness is decided by the
/// store insert itself, never by a lookup first, so two racing registrations
/// of the same username cannot both succeed. The response carries a message
/// only; no token, id, or hash material.
#[post("/register")]
pub async fn register(
    store: web::Data<UserStore>,
    hasher: web::Data<PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    // Bcrypt at production cost is tens of milliseconds of pure CPU; keep it
    // off the async workers.
    let hasher = hasher.get_ref().clone();
    let password = register_data.password.clone();
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = store
        .create(&register_data.username, &password_hash)
        .await?;
    log::info!("registered user {}", user.username);

    Ok(HttpResponse::Created().json(json!({
        "message": "user registered"
    })))
}

/// Log in and receive a bearer token.
///
/// Unknown username and wrong password both produce the same rejection.
#[post("/login")]
pub async fn login(
    store: web::Data<UserStore>,
    hasher: web::Data<PasswordHasher>,
    issuer: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = match store.find_by_username(&login_data.username).await? {
        Some(user) => user,
        None => return Err(AppError::InvalidCredentials),
    };

    let hasher = hasher.get_ref().clone();
    let password = login_data.password.clone();
    let password_hash = user.password_hash.clone();
    let valid = web::block(move || hasher.verify(&password, &password_hash)).await??;

    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = issuer.issue(user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
