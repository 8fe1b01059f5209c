//! REST API response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{Criticality, GLevel, HospitalizationData, RegionSeries};
use crate::transform::pipeline::LoadStats;

/// Current state of one region, flattened for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub name: String,
    /// Date of the most recent entry
    pub date: Option<NaiveDate>,
    /// Current all-ages incidence
    pub incidence: Option<f64>,
    pub criticality: Option<Criticality>,
    pub rating: Option<f64>,
    pub g_level: Option<GLevel>,
}

impl RegionSummary {
    pub fn new(name: impl Into<String>, series: &RegionSeries) -> Self {
        let current = series.current();
        Self {
            name: name.into(),
            date: current.map(|e| e.date),
            incidence: current.and_then(|e| e.national_incidence()),
            criticality: series.criticality(),
            rating: series.criticality_rating(),
            g_level: series.g_level(),
        }
    }
}

/// Response of `GET /api/regions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsResponse {
    pub total: Option<RegionSummary>,
    pub regions: Vec<RegionSummary>,
    pub stats: LoadStats,
}

impl RegionsResponse {
    pub fn new(data: &HospitalizationData, national_region: &str, stats: LoadStats) -> Self {
        Self {
            total: data
                .total
                .as_ref()
                .map(|series| RegionSummary::new(national_region, series)),
            regions: data
                .regions
                .iter()
                .map(|(name, series)| RegionSummary::new(name.as_str(), series))
                .collect(),
            stats,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::transform::pipeline::assemble;

    const CSV: &str = "Bundesland,Datum,Altersgruppe,7T_Hospitalisierung_Faelle,7T_Hospitalisierung_Inzidenz
Bundesgebiet,2021-11-20,00+,4500,4.5
Sachsen,2021-11-20,00+,500,10.2
Sachsen,2021-11-19,00+,,";

    #[test]
    fn test_regions_response() {
        let output = assemble(CSV, &LoaderConfig::default());
        let response = RegionsResponse::new(&output.data, "Bundesgebiet", output.stats.clone());

        let total = response.total.unwrap();
        assert_eq!(total.name, "Bundesgebiet");
        assert_eq!(total.rating, Some(0.5));
        assert_eq!(total.criticality, Some(Criticality::Level2));

        assert_eq!(response.regions.len(), 1);
        let sachsen = &response.regions[0];
        assert_eq!(sachsen.date, NaiveDate::from_ymd_opt(2021, 11, 20));
        assert_eq!(sachsen.g_level, Some(GLevel::Blocked));
        assert_eq!(response.stats.records, 3);
    }

    #[test]
    fn test_summary_of_empty_series() {
        let summary = RegionSummary::new("Bremen", &RegionSeries::new());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "Bremen");
        assert!(json["date"].is_null());
        assert!(json["gLevel"].is_null());
    }

    #[test]
    fn test_error_response() {
        let body = error_response("upstream down");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "upstream down");
    }
}
