//! Defect list rows, filters and sort keys

use super::defect::{DamageItem, DefectDetail, ProcessStatus, Severity};
use crate::util::display_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One row of the defect list (one per damage of an active detail)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectListItem {
    /// Display id, e.g. `RC-0042-7KQ2M`
    pub defect_id: String,
    pub damage_id: i64,
    pub public_id: String,
    pub image_url: String,
    pub location: String,
    pub category: String,
    pub severity: Severity,
    pub status: ProcessStatus,
    pub updated_at: NaiveDateTime,
}

impl DefectListItem {
    pub fn from_damage(detail: &DefectDetail, damage: &DamageItem) -> Self {
        Self {
            defect_id: display_id(&damage.category, damage.id, &detail.public_id),
            damage_id: damage.id,
            public_id: detail.public_id.clone(),
            image_url: detail.image_url.clone(),
            location: detail.address.clone(),
            category: damage.category.clone(),
            severity: detail.severity(),
            status: damage.status,
            updated_at: damage.updated_at,
        }
    }

    /// All rows for one detail, in damage order
    pub fn rows_for(detail: &DefectDetail) -> impl Iterator<Item = Self> + '_ {
        detail
            .damages
            .iter()
            .map(move |damage| Self::from_damage(detail, damage))
    }

    /// Compare by a single column, ascending
    pub fn compare_by(&self, other: &Self, column: SortColumn) -> Ordering {
        match column {
            SortColumn::DefectId => self.defect_id.cmp(&other.defect_id),
            SortColumn::Category => self.category.cmp(&other.category),
            SortColumn::Severity => self.severity.cmp(&other.severity),
            SortColumn::Location => self.location.cmp(&other.location),
            SortColumn::UpdatedAt => self.updated_at.cmp(&other.updated_at),
            SortColumn::Status => self.status.cmp(&other.status),
        }
    }
}

/// Sortable list columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    DefectId,
    Category,
    Severity,
    Location,
    UpdatedAt,
    Status,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefectId => "defectId",
            Self::Category => "category",
            Self::Severity => "severity",
            Self::Location => "location",
            Self::UpdatedAt => "updatedAt",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defectId" | "defect_id" | "id" => Ok(Self::DefectId),
            "category" => Ok(Self::Category),
            "severity" => Ok(Self::Severity),
            "location" => Ok(Self::Location),
            "updatedAt" | "updated_at" | "date" => Ok(Self::UpdatedAt),
            "status" => Ok(Self::Status),
            other => Err(crate::error::AppError::validation(format!(
                "unknown sort column: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// List filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    pub category: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<ProcessStatus>,
    /// Case-insensitive substring of the display id
    pub id_query: Option<String>,
    /// Case-insensitive substring of the location
    pub address_query: Option<String>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, item: &DefectListItem) -> bool {
        if let Some(category) = &self.category
            && item.category != *category
        {
            return false;
        }
        if let Some(severity) = self.severity
            && item.severity != severity
        {
            return false;
        }
        if let Some(status) = self.status
            && item.status != status
        {
            return false;
        }
        contains_ci(&item.defect_id, self.id_query.as_deref())
            && contains_ci(&item.location, self.address_query.as_deref())
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
