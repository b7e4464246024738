use crate::cli::ServeArgs;
use crate::infra::{sample_catalog, AppState, InMemoryApplicationRepository, InMemoryCatalog};
use crate::routes::with_flow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use nextstep::config::AppConfig;
use nextstep::error::AppError;
use nextstep::telemetry;
use nextstep::workflows::applications::{ApplicationTracker, TrackerSinks};
use nextstep::workflows::apply_flow::{ApplyFlowService, SeedCatalog};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) fn load_catalog(path: Option<&Path>) -> Result<InMemoryCatalog, AppError> {
    let catalog = match path {
        Some(path) => {
            let catalog = SeedCatalog::from_path(path)?;
            info!(path = %path.display(), jobs = catalog.jobs.len(), "catalog loaded");
            catalog
        }
        None => sample_catalog(),
    };
    Ok(InMemoryCatalog::from(catalog))
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.apply_flow.catalog_path = Some(catalog);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(config.apply_flow.catalog_path.as_deref())?);
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let tracker = Arc::new(ApplicationTracker::new(repository));
    let flows = Arc::new(ApplyFlowService::new(
        catalog,
        TrackerSinks::new(Arc::clone(&tracker)),
        config.apply_flow.salary_currency.clone(),
    ));

    let app = with_flow_routes(flows, tracker)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "application flow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
