//! Scene tools: offline front end for the environment mesh aggregator and the
//! embedding query engine.
//!
//! - `merge`: replay recorded chunk events and export the merged mesh as OBJ
//! - `query`: score a scan's instance embeddings against a query embedding
//! - `instances`: cut a merged mesh (OBJ or chunk events) into per-instance OBJ files

mod config;
mod instance_exporter;
mod mesh_export;
mod query;
mod replay;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::ToolConfig;
use constants::export::MERGED_MESH_FILE_NAME;
use embedding_query::Selection;
use instance_exporter::InstanceExporter;
use mesh_export::MeshExporter;
use query::{QueryRequest, run_query};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scene-tools")]
#[command(about = "Merge scanned environment meshes and query instance embeddings", long_about = None)]
struct Cli {
    /// JSON config file with thresholds and output settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge a chunk event stream into one OBJ mesh
    Merge {
        /// JSON array of chunk events
        events: PathBuf,
        /// Output OBJ path (default: <output_dir>/environment_mesh.obj)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Select instances whose embeddings match a query embedding
    Query {
        /// Scan file mapping instance ids to embeddings
        scan: PathBuf,
        /// Embedding service reply for the query text
        embedding: PathBuf,
        /// Absolute similarity threshold (overrides config)
        #[arg(long, conflicts_with = "fraction")]
        threshold: Option<f32>,
        /// Keep the top (1 - fraction) of instances (overrides config)
        #[arg(long)]
        fraction: Option<f32>,
        /// Histogram bins to print (0 to disable)
        #[arg(long)]
        bins: Option<usize>,
        /// Query text the embedding was computed for
        #[arg(long)]
        text: Option<String>,
    },
    /// Export one OBJ per instance from the merged mesh
    Instances {
        /// Merged mesh: an exported .obj file or a JSON array of chunk events
        mesh: PathBuf,
        /// JSON mapping instance ids to merged-mesh triangle ids
        triangle_ids: PathBuf,
        /// Output directory (default: config output_dir or the mesh file's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = ToolConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge { events, output } => {
            let output =
                output.unwrap_or_else(|| config.output_dir_for(&events).join(MERGED_MESH_FILE_NAME));
            MeshExporter::new(&output).export(&events)?;
        }
        Commands::Query {
            scan,
            embedding,
            threshold,
            fraction,
            bins,
            text,
        } => {
            let selection = match (threshold, fraction) {
                (Some(t), _) => Selection::Threshold(t),
                (None, Some(f)) => Selection::TopFraction(f),
                (None, None) => config.selection(),
            };
            run_query(&QueryRequest {
                scan_path: &scan,
                embedding_path: &embedding,
                text: text.as_deref(),
                selection,
                histogram_bins: bins.unwrap_or(config.histogram_bins),
            })?;
        }
        Commands::Instances {
            mesh,
            triangle_ids,
            out_dir,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| config.output_dir_for(&mesh));
            InstanceExporter::new(&out_dir).export(&mesh, &triangle_ids)?;
        }
    }

    Ok(())
}
