//! Domain models for the hospitalization loader.
//!
//! - [`AgeGroupMetrics`] - 7-day count and incidence of one age group
//! - [`Entry`] - All age groups of one region on one date
//! - [`RegionSeries`] - Date-descending entries of one region, with derived metrics
//! - [`Criticality`] / [`GLevel`] - Classifications of the national incidence
//! - [`HospitalizationData`] - The `{ total, regions, completeData }` build output
//!
//! Serialized field names follow the keys the site templates read
//! (`hosp7TTotal`, `dataRow`, `gLevel`, ...).

mod region;

pub use region::RegionSeries;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age-group label covering all ages.
pub const ALL_AGES: &str = "00+";

/// Incidence at which a region counts as catastrophic; also the rating divisor.
pub const CRITICAL_INCIDENCE: f64 = 9.0;

/// Number of most recent entries considered for the peak.
pub const PEAK_WINDOW: usize = 5;

/// Region name to its series, ordered by name.
pub type RegionMap = BTreeMap<String, RegionSeries>;

// =============================================================================
// Metrics
// =============================================================================

/// 7-day hospitalization figures of one age group.
///
/// `None` marks a value that did not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgeGroupMetrics {
    #[serde(rename = "hosp7TTotal")]
    pub count: Option<i64>,
    #[serde(rename = "hosp7TInzidenz")]
    pub incidence: Option<f64>,
}

impl AgeGroupMetrics {
    pub fn new(count: i64, incidence: f64) -> Self {
        Self {
            count: Some(count),
            incidence: Some(incidence),
        }
    }

    /// Parse raw CSV fields. Either value becomes `None` if it is not a number.
    pub fn parse(count: &str, incidence: &str) -> Self {
        Self {
            count: count.trim().parse::<i64>().ok(),
            incidence: incidence
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_nan()),
        }
    }
}

// =============================================================================
// Entry
// =============================================================================

/// One region on one date, with metrics per age group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    #[serde(rename = "value")]
    pub metrics: BTreeMap<String, AgeGroupMetrics>,
}

impl Entry {
    pub fn new(date: NaiveDate, metrics: BTreeMap<String, AgeGroupMetrics>) -> Self {
        Self { date, metrics }
    }

    /// Metrics of the all-ages group, if present.
    pub fn national(&self) -> Option<&AgeGroupMetrics> {
        self.metrics.get(ALL_AGES)
    }

    /// All-ages incidence, if present and numeric.
    pub fn national_incidence(&self) -> Option<f64> {
        self.national().and_then(|m| m.incidence)
    }
}

// =============================================================================
// Classifications
// =============================================================================

/// Severity band of the current all-ages incidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    /// Incidence is exactly zero.
    Okay,
    /// Below 3.
    Level1,
    /// Below 6.
    Level2,
    /// Below 9.
    Level3,
    /// 9 and above.
    Catastrophic,
}

impl Criticality {
    /// Bands are checked in ascending order; first match wins.
    pub fn from_incidence(incidence: f64) -> Self {
        if incidence == 0.0 {
            Self::Okay
        } else if incidence < 3.0 {
            Self::Level1
        } else if incidence < 6.0 {
            Self::Level2
        } else if incidence < CRITICAL_INCIDENCE {
            Self::Level3
        } else {
            Self::Catastrophic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Okay => "okay",
            Self::Level1 => "level1",
            Self::Level2 => "level2",
            Self::Level3 => "level3",
            Self::Catastrophic => "catastrophic",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access rule derived from the five-day peak incidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GLevel {
    /// Peak of 9 or more: no rule applies, venues are closed.
    #[serde(rename = "❌")]
    Blocked,
    /// Peak of 6 or more.
    #[serde(rename = "2G+")]
    TwoGPlus,
    /// Peak of 3 or more.
    #[serde(rename = "2G")]
    TwoG,
    /// Below 3.
    #[serde(rename = "3G")]
    ThreeG,
}

impl GLevel {
    pub fn from_peak_incidence(incidence: f64) -> Self {
        if incidence >= CRITICAL_INCIDENCE {
            Self::Blocked
        } else if incidence >= 6.0 {
            Self::TwoGPlus
        } else if incidence >= 3.0 {
            Self::TwoG
        } else {
            Self::ThreeG
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "❌",
            Self::TwoGPlus => "2G+",
            Self::TwoG => "2G",
            Self::ThreeG => "3G",
        }
    }
}

impl std::fmt::Display for GLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Build output
// =============================================================================

/// Data handed to the templating layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalizationData {
    /// The national series (`None` if the source had no national rows).
    pub total: Option<RegionSeries>,
    /// Every other region.
    pub regions: RegionMap,
    /// All regions, national included.
    pub complete_data: RegionMap,
}

impl HospitalizationData {
    /// Split `complete` into the national series and the remaining regions.
    pub fn split(complete: RegionMap, national_region: &str) -> Self {
        let mut regions = complete.clone();
        let total = regions.remove(national_region);

        Self {
            total,
            regions,
            complete_data: complete,
        }
    }

    /// Number of regions, national included.
    pub fn region_count(&self) -> usize {
        self.complete_data.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
