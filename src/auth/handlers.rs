use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{hash_password, is_valid_email, verify_password, AuthUser, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(keys: &JwtKeys, user: &User) -> Result<AuthResponse, (StatusCode, String)> {
    let identity = user.identity();
    let access_token = keys
        .sign_access(identity.user_id, &identity.email)
        .map_err(|e| {
            error!(error = %e, "jwt sign access failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    let refresh_token = keys
        .sign_refresh(identity.user_id, &identity.email)
        .map_err(|e| {
            error!(error = %e, "jwt sign refresh failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: identity.user_id,
            email: identity.email,
        },
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let user = User::create(&state.db, &payload.email, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = match User::find_by_id(&state.db, claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err((StatusCode::UNAUTHORIZED, "User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = %claims.sub, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    Ok(Json(issue_tokens(&keys, &user)?))
}

#[instrument(skip(state, identity))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, identity.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %identity.user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn test_me_response_serialization() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("id"));
    }
}
