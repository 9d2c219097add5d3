use crate::core::currency::CurrencyCode;
use crate::service::RateQueryService;
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

// Every outcome is answered with 200; the body carries the ratio, nothing, or a diagnostic.
async fn exchange_rate(
    State(service): State<Arc<RateQueryService>>,
    Path(currency_code): Path<String>,
) -> impl IntoResponse {
    let body = service.get_ratio(&CurrencyCode::new(&currency_code)).await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
}

pub fn create_router(service: Arc<RateQueryService>) -> Router {
    Router::new()
        .route("/exchangeRate/{currency_code}", get(exchange_rate))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn serve(addr: SocketAddr, service: Arc<RateQueryService>) -> anyhow::Result<()> {
    let router = create_router(service);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(axum::serve(listener, router.into_make_service()).await?)
}
