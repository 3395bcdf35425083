use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRoutineRepository};
use crate::routes::with_tracking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use skincare_tracker::config::AppConfig;
use skincare_tracker::error::AppError;
use skincare_tracker::telemetry;
use skincare_tracker::workflows::tracking::RoutineTrackingService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        tracking: config.tracking,
    };

    let repository = Arc::new(InMemoryRoutineRepository::default());
    let tracking_service = Arc::new(RoutineTrackingService::new(repository, config.tracking));

    let app = with_tracking_routes(tracking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        required_days = config.tracking.default_required_days,
        "skincare tracker ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
