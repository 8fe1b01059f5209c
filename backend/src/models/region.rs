//! Per-region time series and the metrics derived from it.
//!
//! Every accessor recomputes from the current entries; nothing is cached, so
//! pushing an entry changes all derived values immediately.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Criticality, Entry, GLevel, ALL_AGES, CRITICAL_INCIDENCE, PEAK_WINDOW};

/// Entries of one region, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSeries {
    entries: Vec<Entry>,
}

impl RegionSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut series = Self { entries };
        series.sort_by_date();
        series
    }

    /// Add an entry and restore date order.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.sort_by_date();
    }

    // Stable: entries sharing a date keep insertion order.
    fn sort_by_date(&mut self) {
        self.entries.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Age groups of the most recent entry, without the all-ages group.
    pub fn age_groups(&self) -> Vec<&str> {
        self.current()
            .map(|entry| {
                entry
                    .metrics
                    .keys()
                    .map(String::as_str)
                    .filter(|group| *group != ALL_AGES)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The most recent entry.
    pub fn current(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Severity band of the current all-ages incidence.
    pub fn criticality(&self) -> Option<Criticality> {
        self.current_incidence().map(Criticality::from_incidence)
    }

    /// Current all-ages incidence divided by 9. Not clamped.
    pub fn criticality_rating(&self) -> Option<f64> {
        self.current_incidence().map(|v| v / CRITICAL_INCIDENCE)
    }

    /// Entry with the highest all-ages incidence among the five most recent.
    ///
    /// On a tie the more recent entry wins. Entries without a numeric
    /// incidence only win if no entry in the window has one.
    pub fn five_day_peak(&self) -> Option<&Entry> {
        let window = &self.entries[..self.entries.len().min(PEAK_WINDOW)];

        // `None < Some(_)`, so a numeric value always beats a missing one
        window.iter().fold(None, |peak, entry| match peak {
            Some(best) if entry.national_incidence() <= best.national_incidence() => Some(best),
            _ => Some(entry),
        })
    }

    /// Access rule derived from the five-day peak.
    pub fn g_level(&self) -> Option<GLevel> {
        self.five_day_peak()
            .and_then(Entry::national_incidence)
            .map(GLevel::from_peak_incidence)
    }

    fn current_incidence(&self) -> Option<f64> {
        self.current().and_then(Entry::national_incidence)
    }
}

impl Extend<Entry> for RegionSeries {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        self.entries.extend(iter);
        self.sort_by_date();
    }
}

impl FromIterator<Entry> for RegionSeries {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Template view: the entries plus every derived value, under template keys.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionSeriesView<'a> {
    data_row: &'a [Entry],
    age_groups: Vec<&'a str>,
    current_data: Option<&'a Entry>,
    // Key spelled the way the templates read it
    #[serde(rename = "criticallity")]
    criticality: Option<Criticality>,
    crit_rating: Option<f64>,
    #[serde(rename = "maxInz5Days")]
    five_day_peak: Option<&'a Entry>,
    g_level: Option<GLevel>,
}

impl Serialize for RegionSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RegionSeriesView {
            data_row: self.entries(),
            age_groups: self.age_groups(),
            current_data: self.current(),
            criticality: self.criticality(),
            crit_rating: self.criticality_rating(),
            five_day_peak: self.five_day_peak(),
            g_level: self.g_level(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesRows {
    data_row: Vec<Entry>,
}

/// Only `dataRow` is read back; derived keys are recomputed.
impl<'de> Deserialize<'de> for RegionSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SeriesRows::deserialize(deserializer).map(|rows| Self::from_entries(rows.data_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeGroupMetrics;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn entry(day: u32, incidence: Option<f64>) -> Entry {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            ALL_AGES.to_string(),
            AgeGroupMetrics {
                count: Some(1),
                incidence,
            },
        );
        metrics.insert("05-14".to_string(), AgeGroupMetrics::new(0, 0.1));
        metrics.insert("80+".to_string(), AgeGroupMetrics::new(4, 12.0));
        Entry::new(NaiveDate::from_ymd_opt(2021, 11, day).unwrap(), metrics)
    }

    /// Series whose incidences are given most recent first.
    fn series(incidences: &[f64]) -> RegionSeries {
        incidences
            .iter()
            .enumerate()
            .map(|(i, &v)| entry(28 - i as u32, Some(v)))
            .collect()
    }

    #[test]
    fn test_sorted_descending_after_construction() {
        let s = RegionSeries::from_entries(vec![entry(3, Some(1.0)), entry(9, Some(2.0)), entry(5, Some(3.0))]);
        let days: Vec<u32> = s.entries().iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![9, 5, 3]);
    }

    #[test]
    fn test_push_resorts_and_updates_derived_values() {
        let mut s = series(&[1.0]);
        assert_eq!(s.criticality(), Some(Criticality::Level1));

        s.push(entry(1, Some(20.0)));
        assert_eq!(s.len(), 2);
        // Older entry lands at the back; current unchanged.
        assert_eq!(s.current().unwrap().national_incidence(), Some(1.0));

        s.push(entry(30, Some(10.0)));
        assert_eq!(s.current().unwrap().national_incidence(), Some(10.0));
        assert_eq!(s.criticality(), Some(Criticality::Catastrophic));
        assert!(s.entries().windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_extend_resorts() {
        let mut s = series(&[2.0]);
        s.extend(vec![entry(1, Some(1.0)), entry(30, Some(3.0))]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.current().unwrap().national_incidence(), Some(3.0));
    }

    #[test]
    fn test_age_groups_exclude_all_ages() {
        let s = series(&[1.0]);
        assert_eq!(s.age_groups(), vec!["05-14", "80+"]);
    }

    #[test]
    fn test_criticality_rating() {
        assert_eq!(series(&[4.5]).criticality_rating(), Some(0.5));
        assert_eq!(series(&[18.0]).criticality_rating(), Some(2.0));
        assert_eq!(series(&[0.0]).criticality_rating(), Some(0.0));
    }

    #[test]
    fn test_g_level_blocked_on_recent_spike() {
        let s = series(&[10.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(s.five_day_peak().unwrap().national_incidence(), Some(10.0));
        assert_eq!(s.g_level(), Some(GLevel::Blocked));
    }

    #[test]
    fn test_g_level_low() {
        assert_eq!(series(&[1.0, 1.0, 1.0, 1.0, 1.0]).g_level(), Some(GLevel::ThreeG));
    }

    #[test]
    fn test_peak_ignores_entries_outside_window() {
        let s = series(&[1.0, 1.0, 1.0, 1.0, 4.0, 20.0]);
        assert_eq!(s.five_day_peak().unwrap().national_incidence(), Some(4.0));
        assert_eq!(s.g_level(), Some(GLevel::TwoG));
    }

    #[test]
    fn test_peak_with_fewer_than_five_entries() {
        let s = series(&[2.0, 6.5]);
        assert_eq!(s.five_day_peak().unwrap().national_incidence(), Some(6.5));
        assert_eq!(s.g_level(), Some(GLevel::TwoGPlus));
    }

    #[test]
    fn test_peak_tie_prefers_most_recent() {
        let s = series(&[3.0, 7.0, 7.0, 1.0]);
        let peak = s.five_day_peak().unwrap();
        assert_eq!(peak.date, s.entries()[1].date);
    }

    #[test]
    fn test_missing_incidence() {
        let s = RegionSeries::from_entries(vec![entry(20, None), entry(19, Some(4.0))]);
        assert_eq!(s.criticality(), None);
        assert_eq!(s.criticality_rating(), None);
        assert_eq!(s.five_day_peak().unwrap().national_incidence(), Some(4.0));
        assert_eq!(s.g_level(), Some(GLevel::TwoG));

        let all_missing = RegionSeries::from_entries(vec![entry(20, None), entry(19, None)]);
        assert_eq!(all_missing.five_day_peak().unwrap().date, all_missing.entries()[0].date);
        assert_eq!(all_missing.g_level(), None);
    }

    #[test]
    fn test_empty_series() {
        let s = RegionSeries::new();
        assert!(s.is_empty());
        assert!(s.current().is_none());
        assert!(s.age_groups().is_empty());
        assert!(s.criticality().is_none());
        assert!(s.criticality_rating().is_none());
        assert!(s.five_day_peak().is_none());
        assert!(s.g_level().is_none());
    }

    #[test]
    fn test_template_view_keys() {
        let s = series(&[10.0, 2.0]);
        let value = serde_json::to_value(&s).unwrap();

        assert_eq!(value["dataRow"].as_array().unwrap().len(), 2);
        assert_eq!(value["ageGroups"], serde_json::json!(["05-14", "80+"]));
        assert_eq!(value["currentData"]["date"], "2021-11-28");
        assert_eq!(value["criticallity"], "catastrophic");
        assert_eq!(value["critRating"].as_f64().unwrap(), 10.0 / 9.0);
        assert_eq!(value["maxInz5Days"]["value"]["00+"]["hosp7TInzidenz"], 10.0);
        assert_eq!(value["gLevel"], "❌");
    }

    #[test]
    fn test_deserialize_recomputes() {
        let s = series(&[5.0, 8.0, 1.0]);
        let json = serde_json::to_string(&s).unwrap();
        let back: RegionSeries = serde_json::from_str(&json).unwrap();

        assert_eq!(back, s);
        assert_eq!(back.g_level(), Some(GLevel::TwoGPlus));
    }
}
