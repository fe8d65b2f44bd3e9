use shared::dto::{FeatureCollectionDto, FeatureDto};
use shared::error::{AppError, AppResult};
use shared::models::{CoordinateOrder, FeaturePoint, GeoPoint};
use std::collections::HashMap;

/// The session's defect locations, in feed order and keyed by `publicId`
///
/// Points are canonical `(lat, lng)`; the producer's order is resolved once
/// when the feed is ingested.
#[derive(Debug, Clone, Default)]
pub struct GeoSet {
    version: u64,
    features: Vec<FeaturePoint>,
    index: HashMap<String, usize>,
}

impl GeoSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-normalized features
    ///
    /// A repeated `publicId` keeps its first position and the last payload.
    pub fn from_features(features: impl IntoIterator<Item = FeaturePoint>) -> Self {
        let mut set = Self::default();
        for feature in features {
            match set.index.get(&feature.public_id) {
                Some(&pos) => {
                    tracing::debug!(public_id = %feature.public_id, "Duplicate feature, keeping last payload");
                    set.features[pos] = feature;
                }
                None => {
                    set.index.insert(feature.public_id.clone(), set.features.len());
                    set.features.push(feature);
                }
            }
        }
        set
    }

    /// Normalize a capture-point feed
    ///
    /// Features without a usable point geometry are skipped with a warning.
    pub fn from_feature_collection(dto: FeatureCollectionDto, order: CoordinateOrder) -> Self {
        let total = dto.features.len();
        let features: Vec<FeaturePoint> = dto
            .features
            .into_iter()
            .filter_map(|feature| {
                let public_id = feature.properties.public_id.clone();
                match feature_point(feature, order) {
                    Ok(point) => Some(point),
                    Err(e) => {
                        tracing::warn!(public_id = %public_id, error = %e, "Skipping feature");
                        None
                    }
                }
            })
            .collect();

        let set = Self::from_features(features);
        tracing::info!(total, kept = set.len(), order = %order, "Geo set ingested");
        set
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Generation of this set; bumped on every replace
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeaturePoint> {
        self.features.iter()
    }

    pub fn get(&self, public_id: &str) -> Option<&FeaturePoint> {
        self.index.get(public_id).map(|&pos| &self.features[pos])
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.index.contains_key(public_id)
    }

    pub fn public_ids(&self) -> Vec<String> {
        self.features.iter().map(|f| f.public_id.clone()).collect()
    }
}

fn feature_point(feature: FeatureDto, order: CoordinateOrder) -> AppResult<FeaturePoint> {
    let public_id = feature.properties.public_id.trim().to_string();
    if public_id.is_empty() {
        return Err(AppError::invalid_response("feature without publicId"));
    }

    let geometry = feature
        .geometry
        .ok_or_else(|| AppError::invalid_coordinate("feature without geometry"))?;
    if !geometry.kind.eq_ignore_ascii_case("Point") {
        return Err(AppError::invalid_coordinate(format!(
            "unsupported geometry type: {}",
            geometry.kind
        )));
    }
    let point = GeoPoint::from_slice(&geometry.coordinates, order)?;

    let address = feature
        .properties
        .address
        .map(|a| match a.street.as_deref().map(str::trim) {
            Some(street) if !street.is_empty() => street.to_string(),
            _ => a.display(),
        })
        .unwrap_or_default();

    Ok(FeaturePoint {
        public_id,
        point,
        address,
        accuracy_meters: feature.properties.accuracy_meters.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(raw: &str) -> FeatureCollectionDto {
        serde_json::from_str(raw).unwrap()
    }

    const FEED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [127.30, 36.35] },
              "properties": { "publicId": "a", "address": { "street": "대학로 99" }, "accuracyMeters": 3.0 } },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [127.35] },
              "properties": { "publicId": "broken" } },
            { "type": "Feature", "geometry": null,
              "properties": { "publicId": "no-geometry" } },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [127.25, 36.30] },
              "properties": { "publicId": "b", "address": { "province": "대전광역시", "city": "서구" } } },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [127.31, 36.36] },
              "properties": { "publicId": "a", "accuracyMeters": 1.5 } }
        ]
    }"#;

    #[test]
    fn test_ingest_normalizes_lng_lat() {
        let set = GeoSet::from_feature_collection(feed(FEED), CoordinateOrder::LngLat);
        let b = set.get("b").unwrap();
        assert_eq!(b.point.lat(), 36.30);
        assert_eq!(b.point.lng(), 127.25);
        assert_eq!(b.address, "대전광역시 서구");
    }

    #[test]
    fn test_bad_features_are_skipped() {
        let set = GeoSet::from_feature_collection(feed(FEED), CoordinateOrder::LngLat);
        assert!(!set.contains("broken"));
        assert!(!set.contains("no-geometry"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicate_keeps_first_position_last_payload() {
        let set = GeoSet::from_feature_collection(feed(FEED), CoordinateOrder::LngLat);
        assert_eq!(set.public_ids(), vec!["a", "b"]);
        let a = set.get("a").unwrap();
        assert_eq!(a.accuracy_meters, 1.5);
        assert_eq!(a.point.lat(), 36.36);
    }

    #[test]
    fn test_wrong_order_is_rejected_not_swapped() {
        // Read as lat/lng, 127.30 is not a latitude
        let set = GeoSet::from_feature_collection(feed(FEED), CoordinateOrder::LatLng);
        assert!(set.is_empty());
    }

    #[test]
    fn test_auto_order() {
        let set = GeoSet::from_feature_collection(feed(FEED), CoordinateOrder::Auto);
        assert_eq!(set.get("a").unwrap().point.lat(), 36.36);
    }
}
