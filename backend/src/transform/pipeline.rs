//! High-level load API: source → CSV text → region series → build output.
//!
//! # Example
//!
//! ```rust,ignore
//! use hospit::{load, LoaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = load(&LoaderConfig::from_env()?).await?;
//!
//!     println!("{} regions", output.data.region_count());
//!     Ok(())
//! }
//! ```

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::grouper::{group_by_region, SkippedRow};
use crate::api::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::config::{LoaderConfig, Source};
use crate::error::LoadResult;
use crate::fetch::{fetch_csv, http_client};
use crate::models::HospitalizationData;
use crate::parser::{parse_csv, parse_csv_file};

/// Counters describing one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    /// Size of the CSV text
    pub bytes: usize,
    /// Data rows parsed
    pub records: usize,
    /// Regions found, national included
    pub regions: usize,
    /// Rows dropped because their date did not parse
    pub skipped_rows: usize,
}

/// Result of a complete load
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub data: HospitalizationData,
    pub stats: LoadStats,
    pub skipped: Vec<SkippedRow>,
}

/// Load from the configured source, creating an HTTP client if needed.
pub async fn load(config: &LoaderConfig) -> LoadResult<LoadOutput> {
    match &config.source {
        Source::Url(_) => {
            let client = http_client()?;
            load_with_client(&client, config).await
        }
        Source::File(path) => load_file(path, config),
    }
}

/// Load using an existing HTTP client (ignored for file sources).
pub async fn load_with_client(client: &Client, config: &LoaderConfig) -> LoadResult<LoadOutput> {
    match &config.source {
        Source::Url(url) => {
            let text = fetch_csv(client, url).await?;
            Ok(assemble(&text, config))
        }
        Source::File(path) => load_file(path, config),
    }
}

/// Load from a CSV file on disk.
pub fn load_file(path: &Path, config: &LoaderConfig) -> LoadResult<LoadOutput> {
    log_info(format!("📖 Reading {}", path.display()));
    let parsed = parse_csv_file(path, config.delimiter)?;
    log_success(format!("Detected encoding: {}", parsed.encoding));

    let bytes = std::fs::metadata(path).map(|m| m.len() as usize).unwrap_or(0);
    Ok(assemble_records(parsed.records, bytes, config))
}

/// Parse, group and split CSV text. Pure apart from logging.
pub fn assemble(text: &str, config: &LoaderConfig) -> LoadOutput {
    assemble_records(parse_csv(text, config.delimiter), text.len(), config)
}

fn assemble_records(
    records: Vec<crate::parser::RawRecord>,
    bytes: usize,
    config: &LoaderConfig,
) -> LoadOutput {
    log_success(format!("Parsed {} rows", records.len()));

    log_info("📦 Grouping by region and date...");
    let grouped = group_by_region(&records);
    log_success(format!("{} regions", grouped.regions.len()));
    report_skipped(&grouped.skipped);

    let data = HospitalizationData::split(grouped.regions, &config.national_region);
    if data.total.is_none() {
        log_warning(format!("No rows for national region '{}'", config.national_region));
    }

    let stats = LoadStats {
        bytes,
        records: records.len(),
        regions: data.region_count(),
        skipped_rows: grouped.skipped.len(),
    };

    LoadOutput {
        data,
        stats,
        skipped: grouped.skipped,
    }
}

fn report_skipped(skipped: &[SkippedRow]) {
    if skipped.is_empty() {
        return;
    }
    log_warning(format!("{} rows skipped (unparseable date)", skipped.len()));
    for row in skipped.iter().take(5) {
        log_warning_indent(format!("row {}: {} '{}'", row.row + 1, row.region, row.date), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criticality, GLevel, ALL_AGES};
    use axum::{routing::get, Router};
    use std::io::Write;

    const SAMPLE: &str = "\
Datum,Bundesland,Bundesland_Id,Altersgruppe,7T_Hospitalisierung_Faelle,7T_Hospitalisierung_Inzidenz
2021-11-20,Bundesgebiet,00,00+,4500,5.41
2021-11-20,Bundesgebiet,00,80+,1500,25.01
2021-11-19,Bundesgebiet,00,00+,4300,5.17
2021-11-20,Bayern,09,00+,1200,9.12
2021-11-19,Bayern,09,00+,1100,8.37
2021-11-20,Hamburg,02,00+,40,2.16
";

    #[test]
    fn test_assemble_sample() {
        let output = assemble(SAMPLE, &LoaderConfig::default());
        let data = &output.data;

        let total = data.total.as_ref().unwrap();
        assert_eq!(total.len(), 2);
        assert_eq!(total.age_groups(), vec!["80+"]);
        assert_eq!(total.criticality(), Some(Criticality::Level2));
        assert_eq!(total.g_level(), Some(GLevel::TwoG));

        assert_eq!(data.regions.len(), 2);
        assert_eq!(data.regions["Bayern"].criticality(), Some(Criticality::Catastrophic));
        assert_eq!(data.regions["Hamburg"].g_level(), Some(GLevel::ThreeG));
        assert_eq!(data.complete_data.len(), 3);

        assert_eq!(
            output.stats,
            LoadStats { bytes: SAMPLE.len(), records: 6, regions: 3, skipped_rows: 0 }
        );
    }

    #[test]
    fn test_single_national_row() {
        let csv = "Bundesland,Datum,Altersgruppe,7T_Hospitalisierung_Faelle,7T_Hospitalisierung_Inzidenz\nBundesgebiet,2021-11-20,00+,10,1.5";
        let output = assemble(csv, &LoaderConfig::default());

        let total = output.data.total.unwrap();
        assert_eq!(total.len(), 1);
        let metrics = total.current().unwrap().metrics[ALL_AGES];
        assert_eq!(metrics.count, Some(10));
        assert_eq!(metrics.incidence, Some(1.5));
        assert!(output.data.regions.is_empty());
    }

    #[test]
    fn test_empty_and_header_only() {
        for text in ["", "Datum,Bundesland\n"] {
            let output = assemble(text, &LoaderConfig::default());
            assert!(output.data.total.is_none());
            assert!(output.data.regions.is_empty());
            assert_eq!(output.stats.records, 0);
        }
    }

    #[test]
    fn test_custom_delimiter_and_national_region() {
        let csv = "Bundesland;Datum;Altersgruppe;7T_Hospitalisierung_Faelle;7T_Hospitalisierung_Inzidenz\nDeutschland;2021-11-20;00+;10;3.3\nBerlin;2021-11-20;00+;5;1.0";
        let config = LoaderConfig::default()
            .with_delimiter(';')
            .with_national_region("Deutschland");

        let output = assemble(csv, &config);
        assert!(output.data.total.is_some());
        assert_eq!(output.data.regions.keys().collect::<Vec<_>>(), vec!["Berlin"]);
    }

    #[test]
    fn test_output_json_shape() {
        let output = assemble(SAMPLE, &LoaderConfig::default());
        let json = serde_json::to_value(&output.data).unwrap();

        assert!(json["total"]["dataRow"].is_array());
        assert_eq!(json["total"]["gLevel"], "2G");
        assert!(json["regions"]["Bayern"].is_object());
        assert!(json["regions"].get("Bundesgebiet").is_none());
        assert!(json["completeData"]["Bundesgebiet"].is_object());
    }

    #[test]
    fn test_load_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let config = LoaderConfig::default().with_source_file(file.path());
        let output = load_file(file.path(), &config).unwrap();

        assert_eq!(output.stats.records, 6);
        assert_eq!(output.stats.bytes, SAMPLE.len());
        assert_eq!(output.data.region_count(), 3);
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let app = Router::new().route("/hospit.csv", get(|| async { SAMPLE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = LoaderConfig::default().with_source_url(format!("http://{}/hospit.csv", addr));
        let output = load(&config).await.unwrap();

        assert_eq!(output.data.region_count(), 3);
        assert!(output.data.total.is_some());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let config = LoaderConfig::default().with_source_file("/nonexistent/hospit.csv");
        assert!(load(&config).await.is_err());
    }
}
