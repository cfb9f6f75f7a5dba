pub mod catalog;
pub mod render;

use crate::core::Storage;
use crate::error::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    storage: Storage,
}

pub fn router(storage: Storage) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/transcript/{video_id}", get(transcript_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { storage })
}

pub async fn serve(storage: Storage, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("channel-digest viewer listening on http://{addr}");
    axum::serve(listener, router(storage)).await?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn index_handler(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match catalog::list_videos(&state.storage).await {
        Ok(videos) => (StatusCode::OK, Html(render::index_page(&videos))),
        Err(e) => {
            tracing::error!("Failed to list videos: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render::index_page(&[])))
        }
    }
}

async fn transcript_handler(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> (StatusCode, Html<String>) {
    match catalog::get_video(&state.storage, &video_id).await {
        Ok(Some(video)) => (StatusCode::OK, Html(render::detail_page(&video))),
        Ok(None) => (StatusCode::NOT_FOUND, Html(render::not_found_page())),
        Err(e) => {
            tracing::error!("Failed to load video {video_id}: {e}");
            (StatusCode::NOT_FOUND, Html(render::not_found_page()))
        }
    }
}
