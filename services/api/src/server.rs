use crate::cli::ServeArgs;
use crate::demo::seed_demo_data;
use crate::infra::AppState;
use crate::routes::with_tracker_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use huntpilot::config::AppConfig;
use huntpilot::error::AppError;
use huntpilot::telemetry;
use huntpilot::workflows::applications::{InMemoryTrackerRepository, TrackerService, UserId};
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryTrackerRepository::default());
    let tracker_service = Arc::new(TrackerService::new(repository));

    if config.seed.enabled {
        let owner = UserId(config.seed.owner.clone());
        let seeded = seed_demo_data(tracker_service.as_ref(), &owner, Local::now().date_naive())?;
        info!(%owner, seeded, "demo applications seeded");
    }

    let app = with_tracker_routes(tracker_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "huntpilot tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
