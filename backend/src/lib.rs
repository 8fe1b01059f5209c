//! # Hospit - COVID-19 hospitalization data for static site builds
//!
//! Fetches the RKI hospitalization CSV, reshapes it into one date-descending
//! series per federal state and exposes derived metrics (criticality band,
//! rating, five-day peak, G-level) to the site templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────────┐
//! │  RKI CSV    │────▶│   Parser    │────▶│   Grouper   │────▶│ total / regions │
//! │ (HTTP/file) │     │ (split only)│     │(region,date)│     │  (JSON output)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hospit::{load, LoaderConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let output = load(&LoaderConfig::default()).await.unwrap();
//!     let total = output.data.total.unwrap();
//!     println!("Germany: {:?} ({:?})", total.criticality(), total.g_level());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Source, delimiter and national region settings
//! - [`models`] - Entries, region series and classifications
//! - [`parser`] - Minimal CSV parsing
//! - [`fetch`] - Upstream download
//! - [`transform`] - Grouping and the load pipeline
//! - [`api`] - HTTP API server and logging

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod fetch;
pub mod parser;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors & Config
// =============================================================================

pub use config::{LoaderConfig, Source, DEFAULT_SOURCE_URL, NATIONAL_REGION};
pub use error::{ConfigError, FetchError, LoadError, ServerError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AgeGroupMetrics,
    Criticality,
    Entry,
    GLevel,
    HospitalizationData,
    RegionMap,
    RegionSeries,
    ALL_AGES,
};

// =============================================================================
// Re-exports - Parsing & Fetching
// =============================================================================

pub use fetch::{fetch_csv, http_client};
pub use parser::{parse_bytes, parse_csv, parse_csv_file, ParseResult, RawRecord};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    assemble,
    group_by_region,
    load,
    load_file,
    load_with_client,
    GroupResult,
    LoadOutput,
    LoadStats,
    SkippedRow,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, RegionSummary, RegionsResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
