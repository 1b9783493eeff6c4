//! Content import tool
//!
//! Reads a JSON content fixture and writes it into `content.db` under the
//! given database directory, creating the database when needed.

use anyhow::{bail, Result};
use clap::Parser;
use download_listing_server::content_import::{import_content, load_fixture};
use download_listing_server::open_content_db;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-import")]
#[command(about = "Import a JSON content fixture into the content database")]
struct Args {
    /// Path to the JSON fixture
    #[arg(value_name = "FIXTURE_JSON")]
    fixture: PathBuf,

    /// Directory holding content.db
    #[arg(value_name = "DB_DIR")]
    db_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if !args.db_dir.is_dir() {
        bail!("db_dir is not a directory: {:?}", args.db_dir);
    }

    info!("Loading fixture {}", args.fixture.display());
    let fixture = load_fixture(&args.fixture)?;

    let db_path = args.db_dir.join("content.db");
    info!("Importing into {}", db_path.display());
    let conn = open_content_db(&db_path)?;
    let summary = import_content(&conn, &fixture)?;

    info!("Import Summary");
    info!("==============");
    info!("Pages imported: {}", summary.pages);
    info!("Authors imported: {}", summary.authors);
    info!("Categories imported: {}", summary.categories);
    info!("Downloads imported: {}", summary.downloads);
    info!("Category links imported: {}", summary.category_links);
    info!("Content elements imported: {}", summary.content_elements);

    Ok(())
}
