//! Command-line interface for graphml-neo4j-importer
//!
//! # Usage Examples
//!
//! ```bash
//! # Plain import into a local server without authentication
//! graphml-neo4j-importer -i graph.graphml -e bolt://localhost:7687
//!
//! # Compressed input, prefixed labels only, indexes afterwards
//! graphml-neo4j-importer \
//!   --input graph.graphml.gz \
//!   --endpoint bolt://localhost:7687 \
//!   --username neo4j --password secret \
//!   --label-prefix Src_ --modify-edge-labels false \
//!   --indices "Gene.id;Drug.name"
//! ```

use clap::Parser;
use graphml_neo4j_importer::{run_import, update_check, ImportOpts};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts = ImportOpts::parse();

    if !opts.skip_update_check {
        update_check::check_for_update().await;
    }

    run_import(&opts).await?;
    Ok(())
}
