//! Group raw CSV rows into per-region time series.
//!
//! The upstream file has one row per (region, date, age group). Rows of the
//! same region and date are merged into a single [`Entry`]:
//!
//! ```text
//! CSV Input (flat rows)                    →  RegionSeries
//! ┌──────────────────────────────────┐       ┌──────────────────────────────┐
//! │ Bayern, 2021-11-20, 00+,   1.9   │       │ Bayern                       │
//! │ Bayern, 2021-11-20, 80+,  12.4   │  →    │   2021-11-20 { 00+, 80+ }    │
//! │ Bayern, 2021-11-19, 00+,   1.8   │       │   2021-11-19 { 00+ }         │
//! └──────────────────────────────────┘       └──────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{AgeGroupMetrics, Entry, RegionMap, RegionSeries};
use crate::parser::RawRecord;

pub const REGION_COLUMN: &str = "Bundesland";
pub const DATE_COLUMN: &str = "Datum";
pub const AGE_GROUP_COLUMN: &str = "Altersgruppe";
pub const COUNT_COLUMN: &str = "7T_Hospitalisierung_Faelle";
pub const INCIDENCE_COLUMN: &str = "7T_Hospitalisierung_Inzidenz";

/// A row that carried a region but could not be placed on the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// Index into the record list (0 = first data row)
    pub row: usize,
    pub region: String,
    pub date: String,
}

/// Output of [`group_by_region`].
#[derive(Debug, Clone, Default)]
pub struct GroupResult {
    pub regions: RegionMap,
    pub skipped: Vec<SkippedRow>,
}

/// Group records by region and date into date-descending series.
///
/// Records without a region are ignored. If a (region, date, age group)
/// appears twice, the later row wins.
pub fn group_by_region(records: &[RawRecord]) -> GroupResult {
    let mut grouping: BTreeMap<&str, BTreeMap<NaiveDate, BTreeMap<String, AgeGroupMetrics>>> =
        BTreeMap::new();
    let mut skipped = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let region = field(record, REGION_COLUMN);
        if region.is_empty() {
            continue;
        }

        let raw_date = field(record, DATE_COLUMN);
        let Some(date) = parse_date(raw_date) else {
            skipped.push(SkippedRow {
                row,
                region: region.to_string(),
                date: raw_date.to_string(),
            });
            continue;
        };

        let metrics = AgeGroupMetrics::parse(
            field(record, COUNT_COLUMN),
            field(record, INCIDENCE_COLUMN),
        );

        grouping
            .entry(region)
            .or_default()
            .entry(date)
            .or_default()
            .insert(field(record, AGE_GROUP_COLUMN).to_string(), metrics);
    }

    let regions = grouping
        .into_iter()
        .map(|(region, dates)| {
            let series: RegionSeries = dates
                .into_iter()
                .map(|(date, metrics)| Entry::new(date, metrics))
                .collect();
            (region.to_string(), series)
        })
        .collect();

    GroupResult { regions, skipped }
}

fn field<'a>(record: &'a RawRecord, column: &str) -> &'a str {
    record.get(column).map(String::as_str).unwrap_or("")
}

/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
