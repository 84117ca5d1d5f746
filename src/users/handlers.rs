use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{LoginRequest, Message, UserPayload},
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user).put(update_user))
        .route("/user/:id", get(get_user).delete(delete_user))
        .route("/user/login", post(login))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id)?;
    match state.users.get(id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            warn!(id, "user not found");
            Err(ApiError::NotFound("User not found".into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;

    let hashed = hash_blocking(payload.password).await?;

    // Stats always start at zero, whatever the client sent.
    let record = NewUser {
        name: payload.name,
        email: payload.email,
        password: hashed,
        wins: 0,
        losses: 0,
        draws: 0,
    };

    let user = state.users.create(record).await?;
    info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;

    // An update body's password is always treated as plaintext and
    // rehashed; changing a password goes through this same overwrite.
    let hashed = hash_blocking(payload.password).await?;

    let record = NewUser {
        name: payload.name,
        email: payload.email,
        password: hashed,
        wins: payload.wins,
        losses: payload.losses,
        draws: payload.draws,
    };

    let affected = state.users.update(payload.id, &record).await?;
    if affected != 1 {
        warn!(id = payload.id, "update matched no user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(id = payload.id, "user updated");
    Ok((StatusCode::ACCEPTED, Json(record.into_user(payload.id))))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let id = parse_id(&id)?;
    let removed = state.users.delete(id).await?;
    if removed == 0 {
        warn!(id, "delete matched no user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(id, "user deleted");
    Ok((
        StatusCode::ACCEPTED,
        Json(Message {
            msg: format!("Success {removed} record removed"),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;

    let user = match state.users.get_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(email = %payload.email, "login for unknown email");
            return Err(ApiError::BadRequest("User not found".into()));
        }
        Err(e) => {
            // A lookup fault reads like a miss to the client; the store
            // detail stays in the log.
            error!(error = %e, "login lookup failed");
            return Err(ApiError::BadRequest("User not found".into()));
        }
    };

    let secret = user.password.clone();
    let plain = payload.password;
    let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &secret))
        .await
        .map_err(|e| ApiError::Hashing(e.to_string()))?;

    if !ok {
        warn!(id = user.id, "login with wrong password");
        return Err(ApiError::BadRequest("Record not found".into()));
    }

    // No session or token is issued yet; the caller gets the record with
    // the secret stripped by serialization.
    info!(id = user.id, "user logged in");
    Ok(Json(user))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Missing params".into()))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection, "malformed request body");
    ApiError::BadRequest(rejection.body_text())
}

/// bcrypt at the configured cost is a few hundred milliseconds of CPU;
/// it runs on the blocking pool so the dispatch path stays free.
async fn hash_blocking(plain: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| ApiError::Hashing(e.to_string()))?
        .map_err(|e| ApiError::Hashing(e.to_string()))
}
