#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for hotel safety analysis.
//!
//! `analyze` runs one analysis, prints the summary and score breakdown,
//! and saves the full report as JSON. `serve` starts the HTTP API.
//!
//! Credentials and provider settings come from the environment
//! (`SERPAPI_KEY`, `AI_PROVIDER`, `GEMINI_API_KEY`, ...).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotel_safety_analyzer::Analyzer;
use hotel_safety_report::render::{render_breakdown, render_summary};

/// Family-safety analysis for hotels and venues.
#[derive(Parser)]
#[command(name = "hotel_safety")]
#[command(about = "Family-safety analysis for hotels and venues")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze one venue and print the results.
    Analyze {
        /// Venue name or free-text search query.
        query: String,

        /// Location bias as `@lat,lng,zoomz`. Defaults to `DEFAULT_LOCATION`.
        #[arg(long)]
        location: Option<String>,

        /// Where to write the JSON report.
        #[arg(long, default_value = hotel_safety_report::DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Print results without writing the report.
        #[arg(long)]
        no_save: bool,
    },

    /// Start the HTTP API server (`BIND_ADDR`, `PORT`).
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            query,
            location,
            output,
            no_save,
        } => {
            let output = (!no_save).then_some(output);
            cmd_analyze(&query, location.as_deref(), output).await?;
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so run it on a blocking
            // thread instead of nesting it inside tokio's.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(async {
                    let analyzer =
                        Analyzer::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;
                    let (bind_addr, port) = hotel_safety_server::bind_from_env();
                    hotel_safety_server::serve(analyzer, bind_addr, port).await
                })
            })
            .await??;
        }
    }

    Ok(())
}

/// Runs one analysis and prints it, saving to `output` when given.
async fn cmd_analyze(
    query: &str,
    location: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = Analyzer::from_env()?;

    println!("Analyzing: {query}");
    println!("Location bias: {}", location.unwrap_or(analyzer.default_location()));
    println!("AI model: {}", analyzer.ai_model());
    println!();

    let report = analyzer
        .run(query, location)
        .await
        .inspect_err(|e| log::error!("Analysis of '{query}' failed: {e}"))?;

    println!("{}", render_summary(&report));
    println!();
    println!("{}", render_breakdown(&report));

    if let Some(path) = output {
        hotel_safety_report::save_report(&report, &path)
            .inspect_err(|e| log::error!("Could not save report to {}: {e}", path.display()))?;
        println!();
        println!("Full report saved to: {}", path.display());
    }

    Ok(())
}
