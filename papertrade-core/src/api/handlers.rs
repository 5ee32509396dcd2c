//! Route handlers
//!
//! Store access and password hashing block, so each handler hands its work
//! to `spawn_blocking` and only awaits the result. Handlers never reject:
//! failures are turned into `{"message"}` replies here.

use std::convert::Infallible;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reject::{MethodNotAllowed, PayloadTooLarge};
use warp::reply::{self, Reply, Response};
use warp::Rejection;

use super::error::{message_reply, ApiError};
use super::AppState;
use crate::domain::result::{Error, Result};
use crate::services::LogEvent;

pub const REGISTER_ROUTE: &str = "/api/auth/register";
pub const LOGIN_ROUTE: &str = "/api/auth/login";
pub const ME_ROUTE: &str = "/api/auth/me";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Event for a failed request. Server-side failures keep the internal detail
/// in `error_details` under the same generic message the caller sees.
fn failure_event(event: &str, route: &str, err: &Error) -> LogEvent {
    let log_event = LogEvent::new(event).with_route(route);
    if err.is_client_error() {
        log_event.with_error(err.to_string())
    } else {
        log_event
            .with_error("Server error")
            .with_error_details(err.to_string())
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> std::result::Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn respond<T: Reply>(result: std::result::Result<T, ApiError>) -> std::result::Result<Response, Infallible> {
    Ok(match result {
        Ok(r) => r.into_response(),
        Err(e) => e.into_response(),
    })
}

/// Token part of an `Authorization: <scheme> <token>` header value
///
/// The scheme is not checked. Everything after it is the token, so a foreign
/// scheme or trailing parts end up failing verification instead of reading
/// as a missing header.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (_scheme, rest) = header?.trim().split_once(char::is_whitespace)?;
    let token = rest.trim_start();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn root() -> reply::Json {
    reply::json(&json!({ "message": "Virtual Stock Trading API" }))
}

pub async fn register(
    body: Bytes,
    state: Arc<AppState>,
) -> std::result::Result<Response, Infallible> {
    respond(handle_register(body, state).await)
}

async fn handle_register(
    body: Bytes,
    state: Arc<AppState>,
) -> std::result::Result<impl Reply, ApiError> {
    let req: RegisterRequest = parse_body(&body)?;

    let session = run_blocking(move || {
        let result = state.auth.register(&req.name, &req.email, &req.password);
        match &result {
            Ok(session) => state.record(
                LogEvent::new("principal_registered")
                    .with_principal(session.user.id)
                    .with_route(REGISTER_ROUTE),
            ),
            Err(e) => state.record(failure_event("register_failed", REGISTER_ROUTE, e)),
        }
        result
    })
    .await?;

    info!(principal = %session.user.id, "principal registered");
    Ok(reply::with_status(reply::json(&session), StatusCode::CREATED))
}

pub async fn login(
    body: Bytes,
    state: Arc<AppState>,
) -> std::result::Result<Response, Infallible> {
    respond(handle_login(body, state).await)
}

async fn handle_login(
    body: Bytes,
    state: Arc<AppState>,
) -> std::result::Result<impl Reply, ApiError> {
    let req: LoginRequest = parse_body(&body)?;

    let session = run_blocking(move || {
        let result = state.auth.login(&req.email, &req.password);
        match &result {
            Ok(session) => state.record(
                LogEvent::new("login_succeeded")
                    .with_principal(session.user.id)
                    .with_route(LOGIN_ROUTE),
            ),
            Err(e) => state.record(failure_event("login_failed", LOGIN_ROUTE, e)),
        }
        result
    })
    .await?;

    info!(principal = %session.user.id, "login succeeded");
    Ok(reply::json(&session))
}

pub async fn me(
    authorization: Option<String>,
    state: Arc<AppState>,
) -> std::result::Result<Response, Infallible> {
    respond(handle_me(authorization, state).await)
}

async fn handle_me(
    authorization: Option<String>,
    state: Arc<AppState>,
) -> std::result::Result<impl Reply, ApiError> {
    let token = bearer_token(authorization.as_deref())
        .ok_or(ApiError::MissingToken)?
        .to_string();

    let profile = run_blocking(move || {
        let id = match state.auth.verify(&token) {
            Ok(id) => id,
            Err(e) => {
                state.record(failure_event("token_rejected", ME_ROUTE, &e));
                return Err(e);
            }
        };
        let profile = state.auth.get_profile(id);
        if let Err(Error::NotFound(_)) = &profile {
            debug!(principal = %id, "token outlived its principal");
        }
        profile
    })
    .await?;

    Ok(reply::json(&profile))
}

/// Replies for requests no route accepted
pub async fn handle_rejection(err: Rejection) -> std::result::Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        debug!("unhandled rejection: {:?}", err);
        (StatusCode::BAD_REQUEST, "Bad request")
    };
    Ok(message_reply(status, message))
}
