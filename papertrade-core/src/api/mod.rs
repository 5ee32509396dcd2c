//! HTTP API
//!
//! | Method | Path                 | Success | Failure                  |
//! |--------|----------------------|---------|--------------------------|
//! | GET    | `/`                  | 200     |                          |
//! | POST   | `/api/auth/register` | 201     | 400, 500                 |
//! | POST   | `/api/auth/login`    | 200     | 400, 500                 |
//! | GET    | `/api/auth/me`       | 200     | 401, 400, 404            |

pub mod error;
pub mod handlers;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::debug;
use warp::{Filter, Reply};

use crate::services::{AuthService, LogEvent, LoggingService};

pub use error::ApiError;

/// Largest request body accepted on the JSON routes
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Shared state handed to every handler
pub struct AppState {
    pub auth: Arc<AuthService>,
    /// Durable event log; `None` disables it
    pub logger: Option<Arc<LoggingService>>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Record an event, ignoring failures (logging never fails a request)
    pub fn record(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log(event) {
                debug!("event log write failed: {}", e);
            }
        }
    }
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

/// All routes with CORS, request tracing and rejection handling applied
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let state = Arc::new(state);

    let root = warp::path::end().and(warp::get()).map(handlers::root);

    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state(Arc::clone(&state)))
        .and_then(handlers::register);

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state(Arc::clone(&state)))
        .and_then(handlers::login);

    let me = warp::path!("api" / "auth" / "me")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state))
        .and_then(handlers::me);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"]);

    root.or(register)
        .or(login)
        .or(me)
        .with(cors)
        .with(warp::trace::request())
        .recover(handlers::handle_rejection)
}

/// Bind the API to `addr`
///
/// Returns the bound address and a future that serves until ctrl-c. Must be
/// called from inside a tokio runtime.
pub fn bind(
    addr: SocketAddr,
    state: AppState,
) -> Result<(SocketAddr, impl Future<Output = ()>), warp::Error> {
    warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, shutdown_signal())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}
