//! Defect locations and details

use super::geo::GeoPoint;
use crate::dto::{DamageDto, DefectDetailDto};
use crate::error::{AppError, AppResult, ErrorCode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repair progress of a single damage (wire value is the ordinal 0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ProcessStatus {
    Reported = 0,
    Received = 1,
    InProgress = 2,
    Completed = 3,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 4] = [
        ProcessStatus::Reported,
        ProcessStatus::Received,
        ProcessStatus::InProgress,
        ProcessStatus::Completed,
    ];

    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Enum name used by the status update endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "REPORTED",
            Self::Received => "RECEIVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ProcessStatus {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| AppError::with_message(ErrorCode::InvalidStatus, format!("unknown status ordinal: {}", value)))
    }
}

impl From<ProcessStatus> for u8 {
    fn from(status: ProcessStatus) -> Self {
        status.ordinal()
    }
}

impl FromStr for ProcessStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::with_message(ErrorCode::InvalidStatus, format!("unknown status: {}", s)))
    }
}

/// One damage found at a capture point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageItem {
    pub id: i64,
    pub category: String,
    pub status: ProcessStatus,
    pub updated_at: NaiveDateTime,
}

impl From<DamageDto> for DamageItem {
    fn from(dto: DamageDto) -> Self {
        Self {
            id: dto.id,
            category: dto.category,
            status: dto.status,
            updated_at: dto.updated_at,
        }
    }
}

/// A defect location in the geo set, coordinates already canonical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePoint {
    pub public_id: String,
    pub point: GeoPoint,
    pub address: String,
    pub accuracy_meters: f64,
}

/// Detail record for one capture point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectDetail {
    pub public_id: String,
    pub address: String,
    pub image_url: String,
    /// Risk score in `[0, 1]`
    pub risk: f64,
    pub damages: Vec<DamageItem>,
}

impl DefectDetail {
    /// Combine a fetched payload with the feature it was fetched for
    pub fn from_dto(feature: &FeaturePoint, dto: DefectDetailDto) -> AppResult<Self> {
        let risk = dto.risk.unwrap_or(0.0);
        if !risk.is_finite() {
            return Err(AppError::invalid_response(format!(
                "non-finite risk for {}",
                feature.public_id
            )));
        }

        Ok(Self {
            public_id: feature.public_id.clone(),
            address: feature.address.clone(),
            image_url: dto.image_url.unwrap_or_default(),
            risk: risk.clamp(0.0, 1.0),
            damages: dto.damages.into_iter().map(DamageItem::from).collect(),
        })
    }

    /// At least one damage is not `COMPLETED`
    pub fn has_incomplete_damage(&self) -> bool {
        self.damages.iter().any(|d| !d.status.is_completed())
    }

    pub fn severity(&self) -> Severity {
        Severity::from_risk(self.risk)
    }

    pub fn damage_mut(&mut self, damage_id: i64) -> Option<&mut DamageItem> {
        self.damages.iter_mut().find(|d| d.id == damage_id)
    }
}

/// Severity band derived from the risk score
///
/// The score is a road condition score: lower means worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_risk(risk: f64) -> Self {
        if risk < 0.4 {
            Self::Critical
        } else if risk < 0.6 {
            Self::High
        } else if risk < 0.8 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(AppError::validation(format!("unknown severity: {}", other))),
        }
    }
}
