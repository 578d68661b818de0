use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{DeleteResult, NewUser, UpdateResult, UserPatch},
        repo_types::User,
        services,
        validation::{check_email, check_mobile},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create-user", post(create_user))
        .route("/users", get(list_users))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Unparseable bodies are client errors like any other validation failure.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            warn!(error = %rejection, "rejected request body");
            Err(AppError::Validation(rejection.body_text()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let new = body(payload)?;

    if let Err(e) = check_mobile(new.mobile.as_deref()).and(check_email(new.email.as_deref())) {
        warn!(error = %e, "create rejected");
        return Err(e);
    }

    let user = services::create_user(state.users.as_ref(), new)
        .await
        .inspect_err(|e| warn!(error = %e, "create user failed"))?;

    info!(user_id = %user.user_id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = services::list_users(state.users.as_ref()).await?;
    Ok(Json(users))
}

/// 200 with an array; an unknown id is an empty array, not a 404.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = services::find_users_by_id(state.users.as_ref(), &user_id).await?;
    Ok(Json(users))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UpdateResult>, AppError> {
    let patch = body(payload)?;

    if let Some(mobile) = patch.mobile.as_deref() {
        check_mobile(Some(mobile)).inspect_err(|e| warn!(error = %e, "update rejected"))?;
    }
    if let Some(email) = patch.email.as_deref() {
        check_email(Some(email)).inspect_err(|e| warn!(error = %e, "update rejected"))?;
    }

    let result = services::update_user(state.users.as_ref(), &user_id, patch).await?;
    info!(
        matched = result.matched_count,
        modified = result.modified_count,
        "user update applied"
    );
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let result = services::delete_user(state.users.as_ref(), &user_id).await?;
    info!(deleted = result.deleted_count, "user delete applied");
    Ok(Json(result))
}
