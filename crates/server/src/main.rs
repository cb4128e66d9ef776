use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use server_api::{
    featured_projects, page_view_count, record_page_view, submit_message, ApiContext,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{MessageSummary, PageViewsResponse, ProjectsResponse, SubmitMessageRequest},
};
use storage::Storage;
use tokio::sync::RwLock;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

mod config;
mod render;

use config::{load_settings, prepare_database_url};

struct AppState {
    api: ApiContext,
    page: RwLock<Option<CachedPage>>,
    revalidate: Duration,
}

struct CachedPage {
    html: String,
    rendered_at: Instant,
}

const MAX_REQUEST_BYTES: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        content: settings.content.clone(),
    };

    let state = AppState {
        api,
        page: RwLock::new(None),
        revalidate: Duration::from_secs(settings.revalidate_seconds),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/healthz", get(healthz))
        .route("/api/views", get(api_views))
        .route("/api/projects", get(api_projects))
        .route("/api/messages", post(api_submit_message))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Renders the landing page, reusing the cached body within the
/// revalidation window. Each regeneration (not each hit) records one page
/// view; the increment runs as a detached task so the response is never
/// held waiting for it, and a failed increment is logged inside the task.
async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    {
        let slot = state.page.read().await;
        if let Some(page) = slot.as_ref() {
            if page.rendered_at.elapsed() < state.revalidate {
                return Html(page.html.clone());
            }
        }
    }

    let mut slot = state.page.write().await;
    // Re-check: another request may have regenerated while we waited.
    if let Some(page) = slot.as_ref() {
        if page.rendered_at.elapsed() < state.revalidate {
            return Html(page.html.clone());
        }
    }

    let storage = state.api.storage.clone();
    tokio::spawn(async move {
        record_page_view(&storage).await;
    });

    let views = page_view_count(&state.api.storage).await;
    let html = render::render_page(&state.api.content, views);
    *slot = Some(CachedPage {
        html: html.clone(),
        rendered_at: Instant::now(),
    });
    Html(html)
}

async fn api_views(State(state): State<Arc<AppState>>) -> Json<PageViewsResponse> {
    Json(PageViewsResponse {
        views: page_view_count(&state.api.storage).await,
    })
}

async fn api_projects(State(state): State<Arc<AppState>>) -> Json<ProjectsResponse> {
    Json(ProjectsResponse {
        projects: featured_projects(&state.api),
    })
}

async fn api_submit_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Json<MessageSummary>, (StatusCode, Json<ApiError>)> {
    let summary = submit_message(&state.api, req).await.map_err(|e| {
        let status = match e.code {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(e))
    })?;
    Ok(Json(summary))
}
