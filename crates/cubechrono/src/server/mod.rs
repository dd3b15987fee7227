//! Web server: the scramble endpoint plus routes that forward to the API.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use cubechrono_api_client::ApiClient;
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::settings::Settings;

mod auth;
mod error;
mod routes;

pub use error::AppError;

/// State shared by all requests. Immutable after startup.
#[derive(Debug)]
pub struct AppState {
    /// Server settings.
    pub settings: Settings,
    /// Client for the external API.
    pub api: ApiClient,
}
impl AppState {
    /// Constructs the state, including a client for the configured API.
    pub fn new(settings: Settings) -> Arc<Self> {
        let api = ApiClient::with_timeout(&settings.api_url, settings.request_timeout());
        Arc::new(Self { settings, api })
    }
}

/// Runs a blocking API call on the blocking thread pool.
async fn call_api<T, F>(state: &Arc<AppState>, f: F) -> Result<T, cubechrono_api_client::Error>
where
    T: Send + 'static,
    F: FnOnce(&ApiClient) -> Result<T, cubechrono_api_client::Error> + Send + 'static,
{
    let api = state.api.clone();
    tokio::task::spawn_blocking(move || f(&api))
        .await
        .unwrap_or_else(|e| {
            log::error!("API task failed: {e}");
            Err(cubechrono_api_client::Error::Internal("API task failed"))
        })
}

/// Builds the router for all routes.
pub fn router(state: Arc<AppState>) -> Router {
    // The browser script may call the scramble endpoint from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api_routes = Router::new()
        .route("/scrambles", get(routes::generate_scrambles))
        .layer(cors);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/", get(routes::index))
        .route("/login", post(routes::login))
        .route("/register", post(routes::register))
        .route("/logout", post(routes::logout))
        .route("/scrambles", post(routes::proxy_scrambles))
        .route("/new-session", post(routes::new_session))
        .route("/add-time", post(routes::add_time))
        .route("/sessions", get(routes::sessions))
        .route("/session/{id}", get(routes::session))
        .route("/myprofile", get(routes::my_profile))
        .fallback(routes::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        ))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path().to_owned();
    let response = next.run(req).await;
    log::debug!("{method} {uri} -> {}", response.status());
    response
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn serve(settings: Settings) -> Result<()> {
    let address = settings.bind_address();
    log::info!("forwarding to API at {}", settings.api_url);
    let state = AppState::new(settings);

    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("error binding to {address}"))?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    log::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("error installing Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        log::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                log::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("error installing signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
