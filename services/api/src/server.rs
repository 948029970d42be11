use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_tracker_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_tracker::config::AppConfig;
use job_tracker::error::AppError;
use job_tracker::sync;
use job_tracker::telemetry;
use job_tracker::tracker::{InMemoryTrackerStore, TrackerService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryTrackerStore::default());
    let mut service = TrackerService::new(store);

    let integrations = &config.integrations;
    match integrations.service_account_key.as_deref() {
        Some(key_path) => {
            let gateways =
                sync::connect(key_path, integrations.delegated_user.as_deref()).await?;
            service = service
                .with_spreadsheet(gateways.spreadsheet, integrations.spreadsheet_id.clone())
                .with_mailbox(gateways.mailbox, integrations.mailbox_max_results);
            info!(
                spreadsheet = integrations.spreadsheet_id.as_deref().unwrap_or("<provision>"),
                "spreadsheet and mailbox sync enabled"
            );
        }
        None => warn!("GOOGLE_SERVICE_ACCOUNT_KEY not set; spreadsheet and mailbox sync disabled"),
    }

    if let Some(seed) = config.profile.clone() {
        let profile = service.create_profile(seed)?;
        info!(profile_id = %profile.id, "seeded profile from environment");
    }

    let app = with_tracker_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
