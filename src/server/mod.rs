//! HTTP API for the storefront and the admin panel.

mod handlers;
mod state;

pub use handlers::{ApiError, PAGE_SIZE};
pub use state::AppState;

use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use crate::config::Config;
use crate::provider::load_dataset;

pub fn build_router(state: Arc<AppState>) -> Router {
    // The location tree never changes while the process runs.
    let locations = Router::new()
        .route("/api/locations", get(handlers::locations))
        .route("/api/locations/{state}/cities", get(handlers::cities))
        .route("/api/locations/{state}/{city}/regions", get(handlers::regions))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ));

    let admin = Router::new()
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route(
            "/api/admin/vehicles",
            get(handlers::admin_vehicles).post(handlers::create_vehicle),
        )
        .route(
            "/api/admin/vehicles/{id}",
            put(handlers::update_vehicle).delete(handlers::delete_vehicle),
        )
        .route(
            "/api/admin/dealers",
            get(handlers::admin_dealers).post(handlers::create_dealer),
        )
        .route(
            "/api/admin/dealers/{id}",
            put(handlers::update_dealer).delete(handlers::delete_dealer),
        )
        .route("/api/admin/proposals", get(handlers::admin_proposals))
        .route(
            "/api/admin/proposals/{id}",
            get(handlers::get_proposal).delete(handlers::delete_proposal),
        )
        .route(
            "/api/admin/proposals/{id}/status",
            put(handlers::update_proposal_status),
        );

    Router::new()
        .route("/api/vehicles", get(handlers::list_vehicles))
        .route("/api/vehicles/{id}", get(handlers::get_vehicle))
        .route("/api/facets", get(handlers::facets))
        .route("/api/selection", post(handlers::update_selection))
        .route("/api/proposals", post(handlers::submit_proposal))
        .merge(locations)
        .merge(admin)
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request"
    );
    response
}

/// Load the dataset, bind and serve until the process is stopped.
pub async fn start(config: Config) -> io::Result<()> {
    let data_cfg = config.data.clone();
    let (dataset, source) = tokio::task::spawn_blocking(move || load_dataset(&data_cfg))
        .await
        .map_err(io::Error::other)?;

    info!(
        source = %source,
        vehicles = dataset.vehicles.len(),
        dealers = dataset.dealers.len(),
        proposals = dataset.proposals.len(),
        "dataset ready"
    );

    let app = build_router(Arc::new(AppState::new(dataset, source)));
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "AutoProposta server listening on http://{}", addr);
    axum::serve(listener, app).await
}
