use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::StatusSnapshot;
use crate::scheduler::SchedulerHandle;

pub async fn get_status(
    State(scheduler): State<SchedulerHandle>,
) -> Result<Json<StatusSnapshot>, StatusCode> {
    match scheduler.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            warn!("Status request failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub fn create_router(scheduler: SchedulerHandle) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .with_state(scheduler)
}

pub async fn serve(
    listener: TcpListener,
    scheduler: SchedulerHandle,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = create_router(scheduler);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

pub async fn start_server(
    port: u16,
    scheduler: SchedulerHandle,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Status API: http://localhost:{}/api/status", port);
    serve(listener, scheduler, shutdown).await
}
