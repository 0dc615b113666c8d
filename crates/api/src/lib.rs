//! `api` crate: HTTP layer.
//!
//! JSON REST endpoints under `/api`:
//!   GET    /api/employees
//!   POST   /api/employees
//!   GET    /api/employees/{id}
//!   PUT    /api/employees/{id}
//!   DELETE /api/employees/{id}
//!   GET    /api/employees/statistics
//!   GET    /api/employees/departments
//!   GET    /api/employees/health
//!
//! Server-rendered HTML pages at `/`, `/employees/...` and `/dashboard`.

pub mod dto;
pub mod error;
pub mod flash;
pub mod form;
pub mod handlers;
pub mod views;

use std::any::Any;

use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub use error::ApiError;
pub use handlers::AppState;

use handlers::{employees, web};

/// CORS policy for the JSON API; `*` anywhere in `origins` allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o.trim()).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {detail}");
    ApiError::Unexpected.into_response()
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/statistics", get(employees::statistics))
        .route("/employees/departments", get(employees::departments))
        .route("/employees/health", get(employees::health))
        .route(
            "/employees/{id}",
            get(employees::get).put(employees::update).delete(employees::delete),
        )
}

fn web_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(web::home))
        .route("/employees", get(web::list))
        .route("/employees/add", get(web::add_form).post(web::add))
        .route("/employees/edit/{id}", get(web::edit_form).post(web::edit))
        .route("/employees/view/{id}", get(web::view))
        .route("/employees/delete/{id}", post(web::delete))
        .route("/dashboard", get(web::dashboard))
}

/// The full application: both surfaces plus tracing, CORS and panic recovery.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    web_routes()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bind `bind` and serve `app` until Ctrl-C.
pub async fn serve(bind: &str, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
