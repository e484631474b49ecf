//! CoCo Harvest - tabular extraction from the CoCo correspondence knowledge graph
//!
//! This is the main entry point for the coco-harvest command-line interface.
//!
//! Usage:
//!   coco-harvest --output-dir ./data counts
//!   coco-harvest --endpoint http://ldf.fi/coco/sparql all
//!
//! The endpoint password, when required, is read from the COCO_PASSWORD
//! environment variable; there is no interactive prompt.

use clap::{Parser, Subcommand};
use coco_harvest::{table, EndpointConfig, Harvester, SparqlClient};
use polars::prelude::DataFrame;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "coco-harvest")]
#[command(about = "Extract tabular datasets from the CoCo correspondence knowledge graph", long_about = None)]
struct Args {
    /// SPARQL endpoint URL
    #[arg(short, long, default_value = "http://ldf.fi/coco/sparql")]
    endpoint: String,

    /// Directory the Parquet files are written into
    #[arg(short, long, default_value = "./data")]
    output_dir: PathBuf,

    /// Endpoint username; the password is read from COCO_PASSWORD
    #[arg(short, long)]
    username: Option<String>,

    /// Per-query timeout in seconds
    #[arg(long, default_value = "300")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the metadata datasources present in the graph
    Sources,
    /// Letter and actor counts per datasource
    Counts,
    /// Letter metadata from every datasource, stacked into one table
    Letters,
    /// Actor biographical and correspondence-network tables, joined
    Actors,
    /// Run every extraction
    All,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,coco_harvest=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = EndpointConfig::new(args.endpoint.clone()).with_timeout_secs(args.timeout_secs);
    if let Some(username) = args.username.clone() {
        let password = std::env::var("COCO_PASSWORD").unwrap_or_default();
        config = config.with_credentials(username, password);
    }

    let harvester = Harvester::new(SparqlClient::new(config)?)?;

    fs::create_dir_all(&args.output_dir)?;
    println!("Endpoint:   {}", args.endpoint);
    println!("Output dir: {}", args.output_dir.display());
    println!();

    match args.command {
        Command::Sources => {
            let frame = harvester.datasources().await?;
            save(frame, &args.output_dir, "datasources")?;
        }
        Command::Counts => {
            let frame = harvester.letter_and_actor_counts().await?;
            save(frame, &args.output_dir, "letter_and_actor_counts")?;
        }
        Command::Letters => {
            let frame = harvester.all_letters().await?;
            save(frame, &args.output_dir, "letters")?;
        }
        Command::Actors => {
            let frame = harvester.actors().await?;
            save(frame, &args.output_dir, "actors")?;
        }
        Command::All => {
            let frame = harvester.datasources().await?;
            save(frame, &args.output_dir, "datasources")?;

            let frame = harvester.letter_and_actor_counts().await?;
            save(frame, &args.output_dir, "letter_and_actor_counts")?;

            let frame = harvester.all_letters().await?;
            save(frame, &args.output_dir, "letters")?;

            let frame = harvester.actors().await?;
            save(frame, &args.output_dir, "actors")?;
        }
    }

    Ok(())
}

/// Write one extraction table and report its shape.
fn save(mut frame: DataFrame, output_dir: &Path, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = output_dir.join(format!("{name}.parquet"));
    table::write_parquet(&mut frame, &path)?;
    println!(
        "{name}: {} rows x {} columns -> {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    Ok(())
}
