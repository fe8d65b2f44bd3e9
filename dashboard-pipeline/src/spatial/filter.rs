use super::geo_set::GeoSet;
use parking_lot::{Mutex, RwLock};
use shared::dto::FeatureCollectionDto;
use shared::models::{CoordinateOrder, GeoPoint, MapBounds, ResolvedBounds};
use std::sync::Arc;

/// Inclusive containment; unresolved or malformed bounds contain nothing
pub fn is_visible(point: &GeoPoint, bounds: &MapBounds) -> bool {
    bounds
        .resolve()
        .map(|resolved| resolved.contains(point))
        .unwrap_or(false)
}

/// `publicId`s of the features inside `bounds`, in geo-set order
pub fn filter_visible(geo: &GeoSet, bounds: &MapBounds) -> Vec<String> {
    match bounds.resolve() {
        Ok(resolved) => visible_in(geo, &resolved),
        Err(_) => Vec::new(),
    }
}

fn visible_in(geo: &GeoSet, bounds: &ResolvedBounds) -> Vec<String> {
    geo.iter()
        .filter(|feature| bounds.contains(&feature.point))
        .map(|feature| feature.public_id.clone())
        .collect()
}

/// Bit-exact key of a resolved rectangle; `None` for unresolved bounds
type BoundsKey = Option<[u64; 4]>;

fn bounds_key(bounds: &MapBounds) -> BoundsKey {
    bounds.resolve().ok().map(|b| {
        [
            b.north_east().lat().to_bits(),
            b.north_east().lng().to_bits(),
            b.south_west().lat().to_bits(),
            b.south_west().lng().to_bits(),
        ]
    })
}

struct Memo {
    version: u64,
    key: BoundsKey,
    ids: Arc<Vec<String>>,
}

/// Owns the geo set and answers "which features are in view"
///
/// Ingestion normalizes coordinates into `(lat, lng)` using the configured
/// producer order. Results are memoized on `(geo set version, bounds)`; the
/// memo never changes what [`filter_visible`] would return.
pub struct SpatialFeatureFilter {
    order: CoordinateOrder,
    geo: RwLock<Arc<GeoSet>>,
    memo: Mutex<Option<Memo>>,
}

impl SpatialFeatureFilter {
    pub fn new(order: CoordinateOrder) -> Self {
        Self {
            order,
            geo: RwLock::new(Arc::new(GeoSet::empty())),
            memo: Mutex::new(None),
        }
    }

    pub fn coordinate_order(&self) -> CoordinateOrder {
        self.order
    }

    /// Normalize a capture-point feed and make it the current geo set
    pub fn ingest(&self, dto: FeatureCollectionDto) -> Arc<GeoSet> {
        self.replace(GeoSet::from_feature_collection(dto, self.order))
    }

    /// Replace the geo set; the new set gets the next version
    pub fn replace(&self, set: GeoSet) -> Arc<GeoSet> {
        let mut geo = self.geo.write();
        let next = Arc::new(set.with_version(geo.version() + 1));
        *geo = next.clone();
        tracing::debug!(version = next.version(), features = next.len(), "Geo set replaced");
        next
    }

    pub fn geo_set(&self) -> Arc<GeoSet> {
        self.geo.read().clone()
    }

    /// Features inside `bounds`, in geo-set order
    pub fn visible_ids(&self, bounds: &MapBounds) -> Arc<Vec<String>> {
        let geo = self.geo_set();
        let key = bounds_key(bounds);

        let mut memo = self.memo.lock();
        if let Some(m) = memo.as_ref()
            && m.version == geo.version()
            && m.key == key
        {
            return m.ids.clone();
        }

        let ids = Arc::new(filter_visible(&geo, bounds));
        *memo = Some(Memo {
            version: geo.version(),
            key,
            ids: ids.clone(),
        });
        ids
    }
}
