//! Wire payloads of the defect backend
//!
//! These mirror the JSON exactly. Conversion into domain models
//! (coordinate normalization, risk clamping) happens at ingestion.

use crate::models::ProcessStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `GET /api/capture-points`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollectionDto {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<FeatureDto>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDto {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub geometry: Option<GeometryDto>,
    pub properties: PropertiesDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryDto {
    #[serde(rename = "type")]
    pub kind: String,
    /// Producer order; GeoJSON emits `[lng, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesDto {
    pub public_id: String,
    #[serde(default)]
    pub address: Option<AddressDto>,
    #[serde(default)]
    pub accuracy_meters: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDto {
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}

impl AddressDto {
    /// Non-empty parts joined with a space
    pub fn display(&self) -> String {
        [&self.province, &self.city, &self.district, &self.street]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `GET /api/capture-points/{publicId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectDetailDto {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub risk: Option<f64>,
    #[serde(default)]
    pub damages: Vec<DamageDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageDto {
    pub id: i64,
    pub category: String,
    pub status: ProcessStatus,
    pub updated_at: NaiveDateTime,
}

/// `PATCH /api/damages/status/{id}` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl From<ProcessStatus> for StatusUpdateRequest {
    fn from(status: ProcessStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

/// Validation error body returned on 4xx
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<FieldErrorDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorDto {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub default_message: Option<String>,
}

impl ErrorBody {
    /// `field: message` pairs joined with `; `
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| match (&e.field, &e.default_message) {
                (Some(field), Some(msg)) => Some(format!("{}: {}", field, msg)),
                (None, Some(msg)) => Some(msg.clone()),
                (Some(field), None) => Some(field.clone()),
                (None, None) => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_parses() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [127.3845, 36.3504] },
                "properties": {
                    "publicId": "cp-1",
                    "address": { "province": "대전광역시", "city": "유성구", "district": null, "street": "대학로 99" },
                    "accuracyMeters": 4.5
                }
            }]
        }"#;
        let dto: FeatureCollectionDto = serde_json::from_str(raw).unwrap();
        assert_eq!(dto.features.len(), 1);
        let feature = &dto.features[0];
        assert_eq!(feature.properties.public_id, "cp-1");
        assert_eq!(
            feature.properties.address.as_ref().unwrap().display(),
            "대전광역시 유성구 대학로 99"
        );
        assert_eq!(feature.geometry.as_ref().unwrap().coordinates, vec![127.3845, 36.3504]);
    }

    #[test]
    fn test_detail_defaults() {
        let dto: DefectDetailDto = serde_json::from_str("{}").unwrap();
        assert!(dto.image_url.is_none());
        assert!(dto.damages.is_empty());
    }

    #[test]
    fn test_status_update_body() {
        let body = StatusUpdateRequest::from(ProcessStatus::Completed);
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"status":"COMPLETED"}"#);
    }

    #[test]
    fn test_error_body_summary() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"errors":[{"field":"status","defaultMessage":"must not be null"}]}"#,
        )
        .unwrap();
        assert_eq!(body.summary().as_deref(), Some("status: must not be null"));
        assert_eq!(ErrorBody::default().summary(), None);
    }
}
