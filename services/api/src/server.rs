use crate::cli::ServeArgs;
use crate::demo::{accessible_ids, seeded_dnd_entries, standard_hierarchy, MockHrDirectory};
use crate::infra::{AppState, InMemoryCampaignRepository};
use crate::routes::with_campaign_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, RwLock};
use tracing::info;
use vishguard::campaigns::{CampaignService, CampaignState, DndDirectory};
use vishguard::config::AppConfig;
use vishguard::error::AppError;
use vishguard::telemetry;

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

    let today = Utc::now().date_naive();
    let hierarchy = standard_hierarchy();
    let accessible = accessible_ids(&hierarchy);
    let provider = MockHrDirectory::from_tree(&hierarchy, today);
    let repository = Arc::new(InMemoryCampaignRepository::default());

    let campaign_state = Arc::new(CampaignState {
        service: CampaignService::new(repository),
        provider,
        hierarchy,
        accessible,
        dnd: Mutex::new(DndDirectory::with_entries(seeded_dnd_entries(today))),
        safe_hours: RwLock::new(config.safe_hours.clone()),
    });

    let app = with_campaign_routes(campaign_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "campaign dashboard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
