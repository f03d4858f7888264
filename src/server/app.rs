use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, Method};
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRef, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{category_router, questions_router, quiz_router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes;
use crate::db::{CategoryStore, QuestionStore};
use crate::pagination::Pagination;
use crate::settings::Settings;
use crate::telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED, QUIZ_DRAWS};

/// Handlers only reach the database through these handles, so any store
/// implementation can be plugged in.
#[derive(FromRef, Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub pagination: Pagination,
}

impl AppState {
    pub fn new<S>(store: S, pagination: Pagination) -> Self
    where
        S: QuestionStore + CategoryStore,
    {
        let store = Arc::new(store);
        Self {
            questions: store.clone(),
            categories: store,
            pagination,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quiz_router(state))
        .method_not_allowed_fallback(|| async {
            ApiError::method_not_allowed("no handler for this method")
        })
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::not_found("no such route")
        })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server<S>(store: S, settings: &Settings) -> anyhow::Result<()>
where
    S: QuestionStore + CategoryStore,
{
    lazy_static::initialize(&QUESTIONS_CREATED);
    lazy_static::initialize(&QUESTIONS_DELETED);
    lazy_static::initialize(&QUIZ_DRAWS);

    let state = AppState::new(store, Pagination::new(settings.questions_per_page));
    let app = build_router(state);

    let addr = settings.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn metrics() -> Result<Response, ApiError> {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    encoder
        .encode(&prometheus::gather(), &mut buf)
        .map_err(ApiError::internal)?;
    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        buf,
    )
        .into_response())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("Received SIGTERM, shutting down"),
    }
}
