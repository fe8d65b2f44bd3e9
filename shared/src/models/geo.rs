//! Coordinate and viewport types
//!
//! Latitude and longitude are distinct wrapper types so that a swapped pair
//! cannot be passed where the other is expected. Raw `[a, b]` pairs coming
//! from GeoJSON are only turned into a [`GeoPoint`] through
//! [`GeoPoint::from_pair`], which takes the producer's [`CoordinateOrder`].

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Latitude in degrees, `[-90, 90]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Latitude(f64);

impl Latitude {
    pub fn new(value: f64) -> AppResult<Self> {
        if value.is_finite() && (-90.0..=90.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::invalid_coordinate(format!(
                "latitude out of range: {}",
                value
            )))
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Latitude {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Latitude> for f64 {
    fn from(lat: Latitude) -> Self {
        lat.0
    }
}

/// Longitude in degrees, `[-180, 180]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Longitude(f64);

impl Longitude {
    pub fn new(value: f64) -> AppResult<Self> {
        if value.is_finite() && (-180.0..=180.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::invalid_coordinate(format!(
                "longitude out of range: {}",
                value
            )))
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Longitude {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Longitude> for f64 {
    fn from(lng: Longitude) -> Self {
        lng.0
    }
}

/// Order of the two numbers in a raw coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateOrder {
    /// `[lat, lng]`
    LatLng,
    /// `[lng, lat]` (GeoJSON, what the capture-point API emits)
    #[default]
    LngLat,
    /// Decide per pair: a component outside `[-90, 90]` can only be a
    /// longitude. Ambiguous pairs fall back to `LngLat`.
    Auto,
}

impl CoordinateOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatLng => "latlng",
            Self::LngLat => "lnglat",
            Self::Auto => "auto",
        }
    }

    /// Resolve `Auto` for a concrete pair
    fn resolve_for(self, pair: [f64; 2]) -> Self {
        match self {
            Self::Auto => {
                let [a, b] = pair;
                if a.abs() > 90.0 && b.abs() <= 90.0 {
                    Self::LngLat
                } else if b.abs() > 90.0 && a.abs() <= 90.0 {
                    Self::LatLng
                } else {
                    Self::LngLat
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for CoordinateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latlng" | "lat_lng" | "lat,lng" => Ok(Self::LatLng),
            "lnglat" | "lng_lat" | "lng,lat" | "geojson" => Ok(Self::LngLat),
            "auto" => Ok(Self::Auto),
            other => Err(AppError::config(format!("unknown coordinate order: {}", other))),
        }
    }
}

/// A canonical `(lat, lng)` point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Latitude,
    pub lng: Longitude,
}

impl GeoPoint {
    /// Build from plain degrees, validating both ranges
    pub fn new(lat: f64, lng: f64) -> AppResult<Self> {
        Ok(Self {
            lat: Latitude::new(lat)?,
            lng: Longitude::new(lng)?,
        })
    }

    /// Normalize a raw pair using the producer's order
    pub fn from_pair(pair: [f64; 2], order: CoordinateOrder) -> AppResult<Self> {
        match order.resolve_for(pair) {
            CoordinateOrder::LatLng => Self::new(pair[0], pair[1]),
            _ => Self::new(pair[1], pair[0]),
        }
    }

    /// Normalize a raw GeoJSON coordinate array (extra components such as
    /// altitude are ignored)
    pub fn from_slice(values: &[f64], order: CoordinateOrder) -> AppResult<Self> {
        match values {
            [a, b, ..] => Self::from_pair([*a, *b], order),
            _ => Err(AppError::invalid_coordinate(format!(
                "expected at least 2 coordinate components, got {}",
                values.len()
            ))),
        }
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat.value()
    }

    #[inline]
    pub fn lng(&self) -> f64 {
        self.lng.value()
    }
}

/// One corner of the viewport as reported by the map; either field may be
/// missing before the map has resolved its bounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Corner {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Corner {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }
}

/// Viewport rectangle as reported by the map collaborator
///
/// Equality compares all four numeric fields, which is what the viewport
/// tracker uses to suppress redundant updates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    pub north_east: Corner,
    pub south_west: Corner,
}

impl MapBounds {
    /// Bounds before the map has reported anything
    pub const fn unresolved() -> Self {
        Self {
            north_east: Corner { lat: None, lng: None },
            south_west: Corner { lat: None, lng: None },
        }
    }

    pub const fn new(north_east: Corner, south_west: Corner) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// `(ne_lat, ne_lng)` / `(sw_lat, sw_lng)` shorthand
    pub const fn from_corners(ne_lat: f64, ne_lng: f64, sw_lat: f64, sw_lng: f64) -> Self {
        Self::new(Corner::new(ne_lat, ne_lng), Corner::new(sw_lat, sw_lng))
    }

    /// All four fields present
    pub fn is_populated(&self) -> bool {
        self.north_east.lat.is_some()
            && self.north_east.lng.is_some()
            && self.south_west.lat.is_some()
            && self.south_west.lng.is_some()
    }

    /// Validate into a rectangle usable for containment tests
    ///
    /// Fails with `InvalidBounds` when a field is missing, out of range, or
    /// the corners are inverted.
    pub fn resolve(&self) -> AppResult<ResolvedBounds> {
        let (Some(ne_lat), Some(ne_lng), Some(sw_lat), Some(sw_lng)) = (
            self.north_east.lat,
            self.north_east.lng,
            self.south_west.lat,
            self.south_west.lng,
        ) else {
            return Err(AppError::invalid_bounds("map bounds not populated"));
        };

        let north_east = GeoPoint::new(ne_lat, ne_lng)
            .map_err(|e| AppError::invalid_bounds(format!("north-east corner: {}", e)))?;
        let south_west = GeoPoint::new(sw_lat, sw_lng)
            .map_err(|e| AppError::invalid_bounds(format!("south-west corner: {}", e)))?;

        if north_east.lat() < south_west.lat() || north_east.lng() < south_west.lng() {
            return Err(AppError::invalid_bounds(format!(
                "inverted bounds: ne=({}, {}) sw=({}, {})",
                ne_lat, ne_lng, sw_lat, sw_lng
            )));
        }

        Ok(ResolvedBounds {
            north_east,
            south_west,
        })
    }
}

/// A validated viewport: `south_west <= north_east` on both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedBounds {
    north_east: GeoPoint,
    south_west: GeoPoint,
}

impl ResolvedBounds {
    /// Rectangle of `lat_span` x `lng_span` degrees centered on `center`
    pub fn around(center: GeoPoint, lat_span: f64, lng_span: f64) -> AppResult<Self> {
        let half_lat = lat_span.abs() / 2.0;
        let half_lng = lng_span.abs() / 2.0;
        MapBounds::from_corners(
            center.lat() + half_lat,
            center.lng() + half_lng,
            center.lat() - half_lat,
            center.lng() - half_lng,
        )
        .resolve()
    }

    pub fn north_east(&self) -> GeoPoint {
        self.north_east
    }

    pub fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    /// Inclusive on all four edges
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.south_west.lat() <= point.lat()
            && point.lat() <= self.north_east.lat()
            && self.south_west.lng() <= point.lng()
            && point.lng() <= self.north_east.lng()
    }

    pub fn to_map_bounds(&self) -> MapBounds {
        MapBounds::from_corners(
            self.north_east.lat(),
            self.north_east.lng(),
            self.south_west.lat(),
            self.south_west.lng(),
        )
    }
}
