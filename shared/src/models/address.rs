//! Administrative address tree (province > city > district)
//!
//! The raw address JSON mixes two shapes at every level: a bare
//! `{ "district": {...} }` wrapper and a `LocationInfo`
//! (`{ id, district, longitude, latitude }` with a nullable `district`).
//! It is parsed once into [`AddressNode`], where the variant says whether
//! a node has children instead of probing for keys.

use super::geo::{GeoPoint, Latitude, Longitude};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved address selection used to center the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Administrative region id (e.g. `3020000000`)
    pub id: i64,
    pub longitude: Longitude,
    pub latitude: Latitude,
}

impl LocationRef {
    pub fn new(id: i64, latitude: f64, longitude: f64) -> AppResult<Self> {
        Ok(Self {
            id,
            longitude: Longitude::new(longitude)?,
            latitude: Latitude::new(latitude)?,
        })
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// A node of the address tree
#[derive(Debug, Clone, PartialEq)]
pub enum AddressNode {
    /// No sub-levels; always carries a location
    Leaf { location: LocationRef },
    /// Has sub-levels in source order; may also carry its own location
    /// (a city that is itself a region and has districts)
    Branch {
        location: Option<LocationRef>,
        children: Vec<(String, AddressNode)>,
    },
}

impl AddressNode {
    pub fn location(&self) -> Option<LocationRef> {
        match self {
            Self::Leaf { location } => Some(*location),
            Self::Branch { location, .. } => *location,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Child nodes in insertion order (empty for leaves)
    pub fn children(&self) -> &[(String, AddressNode)] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Branch { children, .. } => children,
        }
    }

    pub fn child(&self, name: &str) -> Option<&AddressNode> {
        self.children()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Child names in insertion order
    pub fn child_names(&self) -> Vec<String> {
        self.children().iter().map(|(key, _)| key.clone()).collect()
    }

    /// First child in insertion order
    pub fn first_child(&self) -> Option<(&str, &AddressNode)> {
        self.children()
            .first()
            .map(|(key, node)| (key.as_str(), node))
    }
}

/// The full address tree, provinces in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressTree {
    provinces: Vec<(String, AddressNode)>,
}

impl AddressTree {
    pub fn new(provinces: Vec<(String, AddressNode)>) -> Self {
        Self { provinces }
    }

    /// Parse the raw address JSON
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::address_tree(format!("address tree is not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> AppResult<Self> {
        let Value::Object(map) = value else {
            return Err(AppError::address_tree("address tree root must be an object"));
        };

        let mut provinces = Vec::with_capacity(map.len());
        for (name, raw) in map {
            provinces.push((name.clone(), parse_node(&[name.as_str()], raw)?));
        }

        tracing::debug!(provinces = provinces.len(), "Address tree parsed");
        Ok(Self { provinces })
    }

    pub fn get(&self, name: &str) -> Option<&AddressNode> {
        self.provinces
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Province names in source order
    pub fn level1_options(&self) -> Vec<String> {
        self.provinces.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}

fn parse_node(path: &[&str], raw: &Value) -> AppResult<AddressNode> {
    let Value::Object(obj) = raw else {
        return Err(AppError::address_tree(format!(
            "node {} must be an object",
            path.join(" > ")
        )));
    };

    let location = parse_location(path, obj)?;

    let mut children = Vec::new();
    match obj.get("district") {
        None | Some(Value::Null) => {}
        Some(Value::Object(districts)) => {
            for (name, child) in districts {
                let mut child_path = path.to_vec();
                child_path.push(name.as_str());
                children.push((name.clone(), parse_node(&child_path, child)?));
            }
        }
        Some(_) => {
            return Err(AppError::address_tree(format!(
                "district of {} must be an object or null",
                path.join(" > ")
            )));
        }
    }

    if children.is_empty() {
        match location {
            Some(location) => Ok(AddressNode::Leaf { location }),
            None => Err(AppError::address_tree(format!(
                "leaf {} has no id/coordinates",
                path.join(" > ")
            ))
            .with_detail("path", path.join(" > "))),
        }
    } else {
        Ok(AddressNode::Branch { location, children })
    }
}

/// `id`, `longitude` and `latitude` must be all present or all absent
fn parse_location(path: &[&str], obj: &Map<String, Value>) -> AppResult<Option<LocationRef>> {
    let id = obj.get("id").and_then(Value::as_i64);
    let longitude = obj.get("longitude").and_then(Value::as_f64);
    let latitude = obj.get("latitude").and_then(Value::as_f64);

    match (id, longitude, latitude) {
        (Some(id), Some(lng), Some(lat)) => LocationRef::new(id, lat, lng)
            .map(Some)
            .map_err(|e| AppError::address_tree(format!("{}: {}", path.join(" > "), e))),
        (None, None, None) => Ok(None),
        _ => Err(AppError::address_tree(format!(
            "node {} has a partial location (id/longitude/latitude)",
            path.join(" > ")
        ))),
    }
}
