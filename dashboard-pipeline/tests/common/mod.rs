// dashboard-pipeline/tests/common/mod.rs
// In-memory DefectApi with per-id delays and failures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use dashboard_pipeline::{BackgroundTasks, Config, DashboardState};
use defect_client::DefectApi;
use parking_lot::Mutex;
use shared::dto::{DamageDto, DefectDetailDto, FeatureCollectionDto};
use shared::error::{AppError, AppResult};
use shared::models::{AddressTree, ProcessStatus};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

pub const TREE: &str = r#"{
    "대전광역시": {
        "district": {
            "유성구": { "id": 3020000000, "district": null, "longitude": 127.3561, "latitude": 36.3623 },
            "서구": { "id": 3017000000, "district": null, "longitude": 127.3838, "latitude": 36.3554 }
        }
    },
    "세종특별자치시": { "id": 3611000000, "district": null, "longitude": 127.2890, "latitude": 36.4801 }
}"#;

#[derive(Default)]
pub struct FakeApi {
    /// `(publicId, lat, lng)` in feed order
    features: Mutex<Vec<(String, f64, f64)>>,
    details: Mutex<HashMap<String, DefectDetailDto>>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    status_updates: Mutex<Vec<(i64, ProcessStatus)>>,
    reject_updates: Mutex<bool>,
    /// Delay per `capture_points` call, front first
    feed_delays: Mutex<VecDeque<Duration>>,
    feed_calls: Mutex<usize>,
    update_delay: Mutex<Duration>,
    update_calls: Mutex<usize>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the feed; the detail of each feature gets one damage per status
    pub fn set_features(&self, features: &[(&str, f64, f64, &[ProcessStatus])]) {
        let mut feed = self.features.lock();
        feed.clear();
        for (index, (id, lat, lng, statuses)) in features.iter().enumerate() {
            feed.push((id.to_string(), *lat, *lng));
            self.set_detail(id, 0.5, &damages(index as i64 * 10, statuses));
        }
    }

    pub fn set_detail(&self, public_id: &str, risk: f64, damages: &[DamageDto]) {
        self.details.lock().insert(
            public_id.to_string(),
            DefectDetailDto {
                image_url: Some(format!("https://img.example.com/{}.jpg", public_id)),
                risk: Some(risk),
                damages: damages.to_vec(),
            },
        );
    }

    pub fn set_delay(&self, public_id: &str, delay: Duration) {
        self.delays.lock().insert(public_id.to_string(), delay);
    }

    pub fn fail(&self, public_id: &str) {
        self.failures.lock().insert(public_id.to_string());
    }

    pub fn recover(&self, public_id: &str) {
        self.failures.lock().remove(public_id);
    }

    pub fn reject_updates(&self, reject: bool) {
        *self.reject_updates.lock() = reject;
    }

    /// Queued delays apply to `capture_points` calls in call order
    pub fn queue_feed_delay(&self, delay: Duration) {
        self.feed_delays.lock().push_back(delay);
    }

    pub fn feed_calls(&self) -> usize {
        *self.feed_calls.lock()
    }

    pub fn set_update_delay(&self, delay: Duration) {
        *self.update_delay.lock() = delay;
    }

    /// Status updates started, including ones still in flight
    pub fn update_calls(&self) -> usize {
        *self.update_calls.lock()
    }

    pub fn calls_for(&self, public_id: &str) -> usize {
        self.calls.lock().iter().filter(|id| *id == public_id).count()
    }

    pub fn status_updates(&self) -> Vec<(i64, ProcessStatus)> {
        self.status_updates.lock().clone()
    }
}

#[async_trait]
impl DefectApi for FakeApi {
    async fn capture_points(&self) -> AppResult<FeatureCollectionDto> {
        *self.feed_calls.lock() += 1;
        let delay = self.feed_delays.lock().pop_front();
        // Feed is fixed when the request is made
        let features: Vec<serde_json::Value> = self
            .features
            .lock()
            .iter()
            .map(|(id, lat, lng)| {
                serde_json::json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [lng, lat] },
                    "properties": {
                        "publicId": id,
                        "address": { "province": "대전광역시", "street": format!("{} 도로", id) },
                        "accuracyMeters": 5.0
                    }
                })
            })
            .collect();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let raw = serde_json::json!({ "type": "FeatureCollection", "features": features });
        Ok(serde_json::from_value(raw)?)
    }

    async fn capture_point_detail(&self, public_id: &str) -> AppResult<DefectDetailDto> {
        self.calls.lock().push(public_id.to_string());
        // Payload is fixed when the request is made
        let detail = self.details.lock().get(public_id).cloned();
        let failing = self.failures.lock().contains(public_id);
        let delay = self.delays.lock().get(public_id).copied();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(AppError::network(format!("fetch {} failed", public_id)));
        }
        detail.ok_or_else(|| AppError::not_found(public_id.to_string()))
    }

    async fn update_damage_status(&self, damage_id: i64, status: ProcessStatus) -> AppResult<()> {
        *self.update_calls.lock() += 1;
        let delay = *self.update_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.reject_updates.lock() {
            return Err(AppError::network("status update rejected"));
        }
        self.status_updates.lock().push((damage_id, status));
        Ok(())
    }
}

/// One damage per status, ids starting at `first_id + 1`
pub fn damages(first_id: i64, statuses: &[ProcessStatus]) -> Vec<DamageDto> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| DamageDto {
            id: first_id + i as i64 + 1,
            category: if i % 2 == 0 { "포트홀" } else { "도로균열" }.to_string(),
            status: *status,
            updated_at: NaiveDate::from_ymd_opt(2025, 5, 1 + i as u32)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        })
        .collect()
}

pub fn state_with(api: Arc<FakeApi>) -> (DashboardState, BackgroundTasks) {
    let mut tasks = BackgroundTasks::new();
    let tree = AddressTree::from_json(TREE).unwrap();
    let state = DashboardState::initialize(&Config::default(), tree, api, &mut tasks).unwrap();
    (state, tasks)
}
