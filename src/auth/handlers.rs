use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    error::{ApiError, ApiResult, is_unique_violation},
    model::user::User,
    models::{LoginReqDto, LoginResponse, RegisterReqDto},
};

/// Inserts a new user with a hashed password.
async fn insert_user(name: &str, email: &str, password: &str, pool: &MySqlPool) -> ApiResult<()> {
    let hashed = hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::Internal("Failed to register user".into())
    })?;

    let result = sqlx::query(r#"INSERT INTO users (name, email, password) VALUES (?, ?, ?)"#)
        .bind(name)
        .bind(email)
        .bind(hashed)
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("Email already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "User registered."
        })),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    user: web::Json<RegisterReqDto>,
    pool: web::Data<MySqlPool>,
) -> ApiResult<HttpResponse> {
    let name = user.name.trim();
    let email = user.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || user.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password must not be empty".into(),
        ));
    }

    insert_user(name, &email, &user.password, pool.get_ref()).await?;

    info!(email = %email, "User registered");

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered."
    })))
}

/// Creates the very first user from `ADMIN_*` settings; refuses once any user exists.
#[utoipa::path(
    get,
    path = "/auth/setup-admin",
    responses(
        (status = 201, description = "Admin user created"),
        (status = 409, description = "Setup already complete"),
        (status = 500, description = "ADMIN_EMAIL / ADMIN_PASSWORD missing")
    ),
    tag = "Auth"
)]
pub async fn setup_admin(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool.get_ref())
        .await?;

    if user_count > 0 {
        return Err(ApiError::Conflict(
            "Admin user already exists. Setup is complete.".into(),
        ));
    }

    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Err(ApiError::Internal(
            "ADMIN_EMAIL and ADMIN_PASSWORD must be set".into(),
        ));
    };

    insert_user(
        &config.admin_name,
        &email.trim().to_lowercase(),
        password,
        pool.get_ref(),
    )
    .await?;

    info!(email = %email, "Admin user created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Admin user created successfully! You can now log in."
    })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::BadRequest(
            "Please enter both email and password.".into(),
        ));
    }

    debug!("Fetching user from database");

    // 2️⃣ Fetch user
    let db_user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(user.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await?;

    let Some(db_user) = db_user else {
        info!("Invalid credentials: user not found");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    // 4️⃣ Generate access token
    let access_token = generate_access_token(
        db_user.id,
        db_user.email,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        ApiError::Internal("Failed to sign access token".into())
    })?;

    info!(user_id = db_user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse { access_token }))
}
