use crate::address::AddressHierarchyResolver;
use crate::aggregator::{DetailAggregator, LoadHandle};
use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::listing::{self, ListPaginationStore};
use crate::spatial::SpatialFeatureFilter;
use crate::viewport::ViewportBoundsTracker;
use defect_client::DefectApi;
use parking_lot::{Mutex, RwLock};
use shared::error::AppResult;
use shared::models::{
    AddressTree, DefectDetail, ListFilter, LocationRef, MapBounds, ProcessStatus, ResolvedBounds,
    SortColumn,
};
use std::sync::Arc;

pub use crate::listing::ListPage;

/// Viewport span (degrees) used when centering on a `LocationRef`
pub const DEFAULT_VIEW_SPAN: f64 = 0.05;

/// Dashboard state - holds every pipeline component
///
/// Cheap to clone. Each field has a single writer:
///
/// | Field | Writes |
/// |-------|--------|
/// | address | selection, `LocationRef` |
/// | viewport | `MapBounds` |
/// | spatial | geo set |
/// | aggregator | `DefectDetail` collection |
/// | pagination | page and sort fields |
///
/// # Example
///
/// ```ignore
/// let state = DashboardState::initialize(&config, tree, api, &mut tasks)?;
/// state.load_geo_set().await?.wait().await;
/// state.viewport().on_idle(bounds);
/// let page = state.list_page(&ListFilter::default());
/// ```
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<Config>,
    pub address: Arc<AddressHierarchyResolver>,
    pub viewport: ViewportBoundsTracker,
    pub spatial: Arc<SpatialFeatureFilter>,
    pub aggregator: Arc<DetailAggregator>,
    pub pagination: Arc<RwLock<ListPaginationStore>>,
    api: Arc<dyn DefectApi>,
    /// Last issued load ticket
    load_ticket: Arc<Mutex<u64>>,
}

impl DashboardState {
    /// Build every component and start the viewport debouncer
    pub fn initialize(
        config: &Config,
        tree: AddressTree,
        api: Arc<dyn DefectApi>,
        tasks: &mut BackgroundTasks,
    ) -> AppResult<Self> {
        let pagination = ListPaginationStore::new(config.items_per_page, config.max_visible_pages)?;

        let (viewport, debouncer) = ViewportBoundsTracker::new(config.bounds_debounce());
        let shutdown = tasks.shutdown_token();
        tasks.spawn("bounds_debouncer", TaskKind::Worker, async move {
            debouncer.run(shutdown).await;
        });

        tracing::debug!(
            provinces = tree.len(),
            order = %config.coordinate_order,
            fetch_limit = ?config.fetch_limit(),
            "Dashboard state initialized"
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            address: Arc::new(AddressHierarchyResolver::new(Arc::new(tree))),
            viewport,
            spatial: Arc::new(SpatialFeatureFilter::new(config.coordinate_order)),
            aggregator: Arc::new(DetailAggregator::new(api.clone(), config.fetch_limit())),
            pagination: Arc::new(RwLock::new(pagination)),
            api,
            load_ticket: Arc::new(Mutex::new(0)),
        })
    }

    pub fn address(&self) -> &AddressHierarchyResolver {
        &self.address
    }

    pub fn viewport(&self) -> &ViewportBoundsTracker {
        &self.viewport
    }

    pub fn spatial(&self) -> &SpatialFeatureFilter {
        &self.spatial
    }

    pub fn aggregator(&self) -> &DetailAggregator {
        &self.aggregator
    }

    pub fn location(&self) -> Option<LocationRef> {
        self.address.location()
    }

    pub fn bounds(&self) -> MapBounds {
        self.viewport.bounds()
    }

    // ========== Load cycle ==========

    /// Fetch the geo set, replace it and start a detail generation for it
    ///
    /// Loads are ordered by when they were requested, not by when the feed
    /// arrives: a response overtaken by a newer request is dropped and the
    /// returned handle is empty.
    pub async fn load_geo_set(&self) -> AppResult<LoadHandle> {
        let ticket = {
            let mut latest = self.load_ticket.lock();
            *latest += 1;
            *latest
        };

        let dto = self.api.capture_points().await?;

        let latest = self.load_ticket.lock();
        if *latest != ticket {
            tracing::debug!(ticket, latest = *latest, "Discarding superseded geo set");
            return Ok(LoadHandle::superseded(self.aggregator.generation()));
        }
        let geo = self.spatial.ingest(dto);
        Ok(self.aggregator.load(&geo))
    }

    /// Point the viewport at `location` with a square span in degrees
    pub fn center_on(&self, location: LocationRef, span: f64) -> AppResult<bool> {
        let bounds = ResolvedBounds::around(location.point(), span, span)?;
        Ok(self.viewport.set_map_bounds(bounds.to_map_bounds()))
    }

    // ========== Views ==========

    /// Features in the current viewport
    pub fn visible_ids(&self) -> Arc<Vec<String>> {
        self.spatial.visible_ids(&self.viewport.bounds())
    }

    /// Visible details with at least one unfinished damage
    pub fn active_details(&self) -> Vec<DefectDetail> {
        self.aggregator.active(&self.visible_ids())
    }

    /// `publicId`s the map should draw markers for
    pub fn active_ids(&self) -> Vec<String> {
        self.active_details()
            .into_iter()
            .map(|detail| detail.public_id)
            .collect()
    }

    /// Filter, sort and slice the active list
    ///
    /// The only place the pagination total is written. A filter different
    /// from the previous call's starts at page 1.
    pub fn list_page(&self, filter: &ListFilter) -> ListPage {
        let mut rows = listing::build_rows(&self.active_details(), filter);

        let mut pagination = self.pagination.write();
        if pagination.apply_filter(filter) {
            tracing::debug!(?filter, "List filter changed, back to page 1");
        }
        listing::sort_rows(&mut rows, pagination.sort_column(), pagination.sort_direction());
        pagination.set_total_items(rows.len());
        listing::paginate(rows, &pagination)
    }

    pub fn toggle_sort(&self, column: SortColumn) {
        self.pagination.write().toggle_sort(column);
    }

    pub fn set_current_page(&self, page: i64) {
        self.pagination.write().set_current_page(page);
    }

    pub async fn update_damage_status(&self, damage_id: i64, status: ProcessStatus) -> AppResult<()> {
        self.aggregator.update_damage_status(damage_id, status).await
    }
}
