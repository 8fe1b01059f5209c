//! Hospit CLI - COVID-19 hospitalization data for site builds
//!
//! # Main Commands
//!
//! ```bash
//! hospit build -o src/_data/hospit.json   # Fetch, reshape and write build data
//! hospit summary                          # Print current state per region
//! hospit serve                            # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! hospit parse input.csv                  # Just parse CSV to JSON records
//! ```

use clap::{Args, Parser, Subcommand};
use hospit::{
    load, parse_csv_file, server, Criticality, GLevel, LoadOutput, LoaderConfig, RegionSeries,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hospit")]
#[command(about = "Load RKI COVID-19 hospitalization data for static site builds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Source overrides shared by commands that load data.
#[derive(Args)]
struct SourceArgs {
    /// CSV URL (default: RKI dataset, or HOSPIT_SOURCE_URL)
    #[arg(long, conflicts_with = "input")]
    source_url: Option<String>,

    /// Read the CSV from a local file instead of fetching it
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// CSV delimiter (default: ',')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Region key of the whole country (default: Bundesgebiet)
    #[arg(long)]
    national_region: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, reshape and write `{ total, regions, completeData }` as JSON
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Print the current state of every region
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Parse a CSV file and output its raw records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            source,
            output,
            compact,
        } => cmd_build(source, output.as_deref(), compact).await,

        Commands::Summary { source } => cmd_summary(source).await,

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()).await,

        Commands::Serve { source, port } => cmd_serve(source, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment first, then command-line overrides.
fn resolve_config(args: SourceArgs) -> Result<LoaderConfig, Box<dyn std::error::Error>> {
    let mut config = LoaderConfig::from_env()?;

    if let Some(url) = args.source_url {
        config = config.with_source_url(url);
    }
    if let Some(path) = args.input {
        config = config.with_source_file(path);
    }
    if let Some(delimiter) = args.delimiter {
        config = config.with_delimiter(delimiter);
    }
    if let Some(region) = args.national_region {
        config = config.with_national_region(region);
    }

    Ok(config)
}

async fn cmd_build(
    source: SourceArgs,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(source)?;
    let result = load(&config).await?;
    print_stats(&result);

    let json = if compact {
        serde_json::to_string(&result.data)?
    } else {
        serde_json::to_string_pretty(&result.data)?
    };
    write_output(&json, output).await?;

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_summary(source: SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(source)?;
    let result = load(&config).await?;
    print_stats(&result);

    println!(
        "\n{:<24} {:>10} {:>9} {:<13} {:>6} {:>4}",
        "Region", "Date", "Incidence", "Criticality", "Rating", "G"
    );
    if let Some(ref total) = result.data.total {
        println!("{}", summary_line(&config.national_region, total));
    }
    for (name, series) in &result.data.regions {
        println!("{}", summary_line(name, series));
    }

    Ok(())
}

fn summary_line(name: &str, series: &RegionSeries) -> String {
    let current = series.current();
    format!(
        "{:<24} {:>10} {:>9} {:<13} {:>6} {:>4}",
        name,
        current.map(|e| e.date.to_string()).unwrap_or_else(|| "-".into()),
        current
            .and_then(|e| e.national_incidence())
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".into()),
        series.criticality().as_ref().map(Criticality::as_str).unwrap_or("-"),
        series
            .criticality_rating()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".into()),
        series.g_level().as_ref().map(GLevel::as_str).unwrap_or("-"),
    )
}

async fn cmd_parse(
    input: &Path,
    delimiter: char,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file(input, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output).await?;

    Ok(())
}

async fn cmd_serve(source: SourceArgs, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(source)?;
    server::start_server(port, config).await?;
    Ok(())
}

fn print_stats(result: &LoadOutput) {
    let stats = &result.stats;
    eprintln!("\n📊 Loaded {} bytes", stats.bytes);
    eprintln!("   Rows:    {}", stats.records);
    eprintln!("   Regions: {}", stats.regions);
    if stats.skipped_rows > 0 {
        eprintln!("   Skipped: {}", stats.skipped_rows);
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(p, content).await?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
