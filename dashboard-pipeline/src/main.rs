use anyhow::Context;
use dashboard_pipeline::core::state::DEFAULT_VIEW_SPAN;
use dashboard_pipeline::{BackgroundTasks, Config, DashboardState, TaskKind, init_logger_with_file};
use defect_client::HttpClient;
use shared::models::{AddressTree, ListFilter};
use std::sync::Arc;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        config.log_dir.as_deref(),
    );

    tracing::info!(api = %config.api_base_url, "Dashboard pipeline starting...");

    // 2. Address tree
    let raw = tokio::fs::read_to_string(&config.address_tree_path)
        .await
        .with_context(|| format!("reading address tree {}", config.address_tree_path))?;
    let tree = AddressTree::from_json(&raw)?;

    // 3. State and background tasks
    let client = HttpClient::new(&config.client_config())?;
    let mut tasks = BackgroundTasks::new();
    let state = DashboardState::initialize(&config, tree, Arc::new(client), &mut tasks)?;

    let mut locations = state.address().subscribe();
    let shutdown = tasks.shutdown_token();
    tasks.spawn("location_listener", TaskKind::Listener, async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = locations.recv() => match received {
                    Ok(location) => tracing::info!(
                        id = location.id,
                        lat = location.latitude.value(),
                        lng = location.longitude.value(),
                        "Map center changed"
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Location listener lagged {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });
    tasks.log_summary();

    // 4. Default selection
    if let Err(e) = state.address().select_path(
        &config.default_level1,
        config.default_level2.as_deref(),
        None,
    ) {
        tracing::warn!(error = %e, "Default address selection unavailable");
    }

    // 5. One load cycle
    let handle = state.load_geo_set().await?;
    let generation = handle.generation();
    handle.wait().await;
    tracing::info!(
        generation,
        details = state.aggregator().len(),
        "Detail aggregation finished"
    );

    if let Some(location) = state.location() {
        state.center_on(location, DEFAULT_VIEW_SPAN)?;
    }

    let page = state.list_page(&ListFilter::default());
    tracing::info!(
        visible = state.visible_ids().len(),
        active = page.total_items,
        page = page.current_page,
        total_pages = page.total_pages,
        "Active defect list"
    );
    for row in &page.rows {
        tracing::info!(
            id = %row.defect_id,
            category = %row.category,
            severity = %row.severity,
            status = %row.status,
            location = %row.location,
            "Defect"
        );
    }

    if tasks.check_health() > 0 {
        tracing::warn!("Some background tasks stopped early");
    }
    tasks.shutdown().await;
    Ok(())
}
