use crate::spatial::GeoSet;
use defect_client::DefectApi;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DefectDetail, FeaturePoint, ProcessStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct AggregateState {
    generation: u64,
    cancel: CancellationToken,
    details: HashMap<String, DefectDetail>,
    /// Statuses accepted by the server after the generation's fetches were
    /// issued, keyed by damage id
    overrides: HashMap<i64, ProcessStatus>,
}

/// Handle to one load cycle
///
/// Dropping it does not stop the fetches; a newer [`DetailAggregator::load`]
/// does.
pub struct LoadHandle {
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
}

impl LoadHandle {
    /// Handle of a load that never started its own generation
    pub(crate) fn superseded(generation: u64) -> Self {
        Self {
            generation,
            tasks: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of fetches started by this load
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait until every fetch of this generation finished or was cancelled
    pub async fn wait(self) {
        for result in futures::future::join_all(self.tasks).await {
            if let Err(e) = result
                && e.is_panic()
            {
                tracing::error!(generation = self.generation, error = ?e, "Detail fetch panicked");
            }
        }
    }
}

/// Fetches one detail per feature and keeps them keyed by `publicId`
///
/// Every [`load`](Self::load) starts a new generation: in-flight fetches of
/// the previous one are cancelled and anything they return late is dropped,
/// so the aggregate only ever holds details of the current geo set.
pub struct DetailAggregator {
    api: Arc<dyn DefectApi>,
    state: Arc<RwLock<AggregateState>>,
    limiter: Option<Arc<Semaphore>>,
}

impl DetailAggregator {
    /// `max_concurrent = None` fetches everything at once
    pub fn new(api: Arc<dyn DefectApi>, max_concurrent: Option<usize>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AggregateState {
                generation: 0,
                cancel: CancellationToken::new(),
                details: HashMap::new(),
                overrides: HashMap::new(),
            })),
            limiter: max_concurrent
                .filter(|n| *n > 0)
                .map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Start a generation for `geo`, one fetch per feature
    pub fn load(&self, geo: &GeoSet) -> LoadHandle {
        let (generation, cancel) = {
            let mut state = self.state.write();
            state.cancel.cancel();
            state.generation += 1;
            state.cancel = CancellationToken::new();
            state.details.clear();
            state.overrides.clear();
            (state.generation, state.cancel.clone())
        };

        tracing::info!(generation, features = geo.len(), "Detail aggregation started");

        let tasks = geo
            .iter()
            .cloned()
            .map(|feature| {
                let fetch = FetchTask {
                    api: self.api.clone(),
                    state: self.state.clone(),
                    limiter: self.limiter.clone(),
                    cancel: cancel.clone(),
                    generation,
                    feature,
                };
                tokio::spawn(fetch.run())
            })
            .collect();

        LoadHandle { generation, tasks }
    }

    /// Cancel the current generation's in-flight fetches
    pub fn cancel(&self) {
        self.state.read().cancel.cancel();
    }

    pub fn get(&self, public_id: &str) -> Option<DefectDetail> {
        self.state.read().details.get(public_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().details.is_empty()
    }

    /// Details that are visible and still have unfinished damages, in the
    /// order of `visible_ids`
    pub fn active(&self, visible_ids: &[String]) -> Vec<DefectDetail> {
        let state = self.state.read();
        visible_ids
            .iter()
            .filter_map(|id| state.details.get(id))
            .filter(|detail| detail.has_incomplete_damage())
            .cloned()
            .collect()
    }

    /// Every aggregated detail, fully completed ones included, sorted by
    /// `publicId`
    pub fn historical(&self) -> Vec<DefectDetail> {
        let state = self.state.read();
        let mut details: Vec<DefectDetail> = state.details.values().cloned().collect();
        details.sort_by(|a, b| a.public_id.cmp(&b.public_id));
        details
    }

    /// Change a damage's status on the server, then in the aggregate
    ///
    /// The local copy is only touched after the server accepted the change.
    /// If a reload started while the request was in flight, its fetches may
    /// return the old status; the accepted one is kept for the rest of that
    /// generation.
    pub async fn update_damage_status(&self, damage_id: i64, status: ProcessStatus) -> AppResult<()> {
        let generation = {
            let state = self.state.read();
            if !holds_damage(&state.details, damage_id) {
                return Err(AppError::with_message(
                    ErrorCode::DamageNotFound,
                    format!("damage {} not loaded", damage_id),
                )
                .with_detail("damage_id", damage_id));
            }
            state.generation
        };

        self.api.update_damage_status(damage_id, status).await?;

        let mut state = self.state.write();
        if state.generation != generation {
            tracing::debug!(
                damage_id,
                from = generation,
                to = state.generation,
                "Reload during status update, carrying status over"
            );
            state.overrides.insert(damage_id, status);
        }
        // A reload may have moved the damage to another capture point
        let applied = state
            .details
            .values_mut()
            .find_map(|detail| detail.damage_mut(damage_id));
        match applied {
            Some(item) => item.status = status,
            None => {
                tracing::debug!(damage_id, "Damage left the aggregate during the update");
            }
        }
        Ok(())
    }
}

fn holds_damage(details: &HashMap<String, DefectDetail>, damage_id: i64) -> bool {
    details
        .values()
        .any(|d| d.damages.iter().any(|item| item.id == damage_id))
}

impl Drop for DetailAggregator {
    fn drop(&mut self) {
        self.state.read().cancel.cancel();
    }
}

struct FetchTask {
    api: Arc<dyn DefectApi>,
    state: Arc<RwLock<AggregateState>>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    generation: u64,
    feature: FeaturePoint,
}

impl FetchTask {
    async fn run(self) {
        let public_id = self.feature.public_id.as_str();

        let fetch = async {
            let _permit = match &self.limiter {
                Some(limiter) => limiter.clone().acquire_owned().await.ok(),
                None => None,
            };
            self.api.capture_point_detail(public_id).await
        };

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(public_id, generation = self.generation, "Detail fetch cancelled");
                return;
            }
            result = fetch => result,
        };

        let mut detail = match result.and_then(|dto| DefectDetail::from_dto(&self.feature, dto)) {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(public_id, generation = self.generation, error = %e, "Detail fetch failed");
                return;
            }
        };

        let mut state = self.state.write();
        if state.generation != self.generation {
            tracing::debug!(public_id, generation = self.generation, "Discarding stale detail");
            return;
        }
        for (damage_id, status) in &state.overrides {
            if let Some(item) = detail.damage_mut(*damage_id) {
                item.status = *status;
            }
        }
        state.details.insert(public_id.to_string(), detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::dto::{DefectDetailDto, FeatureCollectionDto};
    use shared::models::GeoPoint;

    struct EchoApi;

    #[async_trait]
    impl DefectApi for EchoApi {
        async fn capture_points(&self) -> AppResult<FeatureCollectionDto> {
            Ok(FeatureCollectionDto::default())
        }

        async fn capture_point_detail(&self, public_id: &str) -> AppResult<DefectDetailDto> {
            if public_id == "fail" {
                return Err(AppError::network("connection reset"));
            }
            Ok(DefectDetailDto {
                image_url: Some(format!("https://img/{}.jpg", public_id)),
                risk: Some(0.5),
                damages: Vec::new(),
            })
        }

        async fn update_damage_status(&self, _: i64, _: ProcessStatus) -> AppResult<()> {
            Ok(())
        }
    }

    fn geo(ids: &[&str]) -> GeoSet {
        GeoSet::from_features(ids.iter().map(|id| FeaturePoint {
            public_id: id.to_string(),
            point: GeoPoint::new(36.35, 127.30).unwrap(),
            address: format!("addr-{}", id),
            accuracy_meters: 0.0,
        }))
    }

    #[tokio::test]
    async fn test_failed_fetch_is_omitted() {
        let aggregator = DetailAggregator::new(Arc::new(EchoApi), None);
        let handle = aggregator.load(&geo(&["a", "fail", "b"]));
        assert_eq!(handle.len(), 3);
        handle.wait().await;

        assert_eq!(aggregator.len(), 2);
        assert!(aggregator.get("fail").is_none());
        let a = aggregator.get("a").unwrap();
        assert_eq!(a.address, "addr-a");
        assert_eq!(a.image_url, "https://img/a.jpg");
    }

    #[tokio::test]
    async fn test_new_generation_clears_previous() {
        let aggregator = DetailAggregator::new(Arc::new(EchoApi), Some(1));
        aggregator.load(&geo(&["a", "b"])).wait().await;
        assert_eq!(aggregator.generation(), 1);

        aggregator.load(&geo(&["c"])).wait().await;
        assert_eq!(aggregator.generation(), 2);
        assert_eq!(
            aggregator
                .historical()
                .into_iter()
                .map(|d| d.public_id)
                .collect::<Vec<_>>(),
            vec!["c"]
        );
    }

    #[tokio::test]
    async fn test_unknown_damage_is_rejected() {
        let aggregator = DetailAggregator::new(Arc::new(EchoApi), None);
        let err = aggregator
            .update_damage_status(99, ProcessStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DamageNotFound);
    }
}
