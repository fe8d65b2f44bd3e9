//! Capture-point API surface

use crate::HttpClient;
use async_trait::async_trait;
use shared::dto::{DefectDetailDto, FeatureCollectionDto, StatusUpdateRequest};
use shared::error::AppResult;
use shared::models::ProcessStatus;

/// Remote operations the dashboard pipeline depends on
#[async_trait]
pub trait DefectApi: Send + Sync {
    /// Every capture point as a GeoJSON feature collection
    async fn capture_points(&self) -> AppResult<FeatureCollectionDto>;

    /// Detail payload for one capture point
    async fn capture_point_detail(&self, public_id: &str) -> AppResult<DefectDetailDto>;

    /// Change the repair status of one damage
    async fn update_damage_status(&self, damage_id: i64, status: ProcessStatus) -> AppResult<()>;
}

#[async_trait]
impl DefectApi for HttpClient {
    async fn capture_points(&self) -> AppResult<FeatureCollectionDto> {
        let collection = self
            .get_optional::<FeatureCollectionDto>(&["api", "capture-points"])
            .await?
            .unwrap_or_default();
        tracing::debug!(features = collection.features.len(), "Capture points fetched");
        Ok(collection)
    }

    async fn capture_point_detail(&self, public_id: &str) -> AppResult<DefectDetailDto> {
        Ok(self
            .get::<DefectDetailDto>(&["api", "capture-points", public_id])
            .await?)
    }

    async fn update_damage_status(&self, damage_id: i64, status: ProcessStatus) -> AppResult<()> {
        let id = damage_id.to_string();
        self.patch(&["api", "damages", "status", id.as_str()], &StatusUpdateRequest::from(status))
            .await?;
        tracing::info!(damage_id, status = %status, "Damage status updated");
        Ok(())
    }
}
