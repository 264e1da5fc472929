//! Axum HTTP server: router, listener, graceful shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ctxid::middleware::locals;
use ctxid::{Context, Correlation, CorrelationLayer, Locals, Settings};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::DemoConfig;
use crate::stats::JobStats;

/// Simulated duration of a background job.
const JOB_DURATION: Duration = Duration::from_millis(250);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub stats: JobStats,
}

/// Build the router.
///
/// `/api/*` and `/health` sit behind the context middleware; `/native/*`
/// behind the locals middleware. Both skip `skip_paths`.
pub fn router(settings: Settings, skip_paths: Vec<String>, state: AppState) -> Router {
    let skip_paths = Arc::new(skip_paths);
    let skips = move |parts: &axum::http::request::Parts| {
        skip_paths.iter().any(|path| path == parts.uri.path())
    };

    let context_routes = Router::new()
        .route("/health", get(handle_health))
        .route("/api/whoami", get(handle_whoami))
        .route("/api/jobs", post(handle_start_job))
        .route("/api/stats", get(handle_stats))
        .layer(CorrelationLayer::new(settings.clone()).skip_if(skips.clone()));

    let native_routes = Router::new()
        .route("/native/info", get(handle_native_info))
        .layer(from_fn_with_state(
            Locals::new(settings).skip_if(skips),
            locals::middleware,
        ));

    Router::new()
        .merge(context_routes)
        .merge(native_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Build and run the HTTP server.
pub async fn run(config: &DemoConfig, settings: Settings, state: AppState) -> anyhow::Result<()> {
    let listen_addr = config.server.listen_address.clone();
    let app = router(settings, config.correlation.skip_paths.clone(), state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "ctxid-demo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ctxid-demo shut down gracefully");
    Ok(())
}

/// Health check. Skipped by the middleware under the default config.
async fn handle_health(id: Option<Correlation>) -> Response {
    Json(serde_json::json!({ "status": "ok", "has_id": id.is_some() })).into_response()
}

/// GET /api/whoami: report the ID bound on the request context.
async fn handle_whoami(ctx: Context) -> Response {
    let id = ctxid::get(&ctx);
    Json(serde_json::json!({
        "correlation_id": id.unwrap_or_default(),
        "has_id": id.is_some(),
    }))
    .into_response()
}

/// POST /api/jobs: accept a job and finish it after the response is sent.
///
/// The spawned task owns a clone of the request context, so it keeps the
/// same correlation ID after the request itself is gone.
async fn handle_start_job(State(state): State<Arc<AppState>>, ctx: Context) -> Response {
    let id = ctxid::get_or_default(&ctx).to_owned();
    state.stats.job_started();

    let stats = state.stats.clone();
    tokio::spawn(async move {
        let span = ctxid_tracing::background_task_span!(ctxid::get_or_default(&ctx), "demo_job");
        async move {
            let start = Instant::now();
            tokio::time::sleep(JOB_DURATION).await;
            tracing::Span::current().record("duration_ms", start.elapsed().as_millis() as u64);
            stats.job_completed();
            tracing::info!("Background job finished");
        }
        .instrument(span)
        .await
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "correlation_id": id, "status": "accepted" })),
    )
        .into_response()
}

/// GET /api/stats: background job counters.
async fn handle_stats(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stats.snapshot()).into_response()
}

/// GET /native/info: the ID is copied out of the request's locals slot.
async fn handle_native_info(Correlation(id): Correlation) -> Response {
    Json(serde_json::json!({ "correlation_id": id, "storage": "request extensions" }))
        .into_response()
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
