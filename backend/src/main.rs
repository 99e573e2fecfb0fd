//! Tablekit CLI - table data engine
//!
//! # Commands
//!
//! ```bash
//! tablekit serve                      # Start HTTP server (port 3000)
//! tablekit import people.csv          # Validate a CSV, print rows + errors
//! tablekit view people.csv --sort age # Print one page of the derived view
//! tablekit export people.csv          # Re-export accepted rows as CSV
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tablekit::{
    config::AppConfig, import_file, ImportResult, SortDirection, TableStore,
};

#[derive(Parser)]
#[command(name = "tablekit")]
#[command(about = "In-memory table engine with CSV import/export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TABLEKIT_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Page size (default: TABLEKIT_ROWS_PER_PAGE or 10)
        #[arg(long)]
        rows_per_page: Option<usize>,

        /// Start with an empty table instead of the sample rows
        #[arg(long)]
        no_seed: bool,
    },

    /// Validate a CSV file and print accepted rows and errors as JSON
    Import {
        /// Input CSV file
        input: PathBuf,
    },

    /// Import a CSV file and print one page of the derived view
    View {
        /// Input CSV file
        input: PathBuf,

        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: usize,

        /// Rows per page
        #[arg(long)]
        rows_per_page: Option<usize>,
    },

    /// Import a CSV file and export the accepted rows
    Export {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: table-data-<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let result = match cli.command {
        Commands::Serve {
            port,
            rows_per_page,
            no_seed,
        } => {
            let config = AppConfig {
                port: port.unwrap_or(config.port),
                rows_per_page: rows_per_page.unwrap_or(config.rows_per_page),
                seed: config.seed && !no_seed,
            };
            cmd_serve(&config).await
        }

        Commands::Import { input } => cmd_import(&input).await,

        Commands::View {
            input,
            search,
            sort,
            desc,
            page,
            rows_per_page,
        } => {
            let options = ViewOptions {
                search,
                sort,
                desc,
                page,
                rows_per_page: rows_per_page.unwrap_or(config.rows_per_page),
            };
            cmd_view(&input, options).await
        }

        Commands::Export { input, output } => cmd_export(&input, output.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tablekit::server::start_server(config).await?;
    Ok(())
}

async fn cmd_import(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = import_file(input).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

struct ViewOptions {
    search: Option<String>,
    sort: Option<String>,
    desc: bool,
    page: usize,
    rows_per_page: usize,
}

async fn cmd_view(input: &Path, options: ViewOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = load_store(input).await?;

    store.set_rows_per_page(options.rows_per_page);
    if let Some(term) = options.search {
        store.set_search_term(term);
    }
    if let Some(field) = options.sort {
        let direction = if options.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        store.set_sorting(field, direction);
    }
    store.set_page(options.page);

    let page = store.view();
    eprintln!(
        "Page {} of {} ({} matching rows)",
        page.page + 1,
        page.page_count.max(1),
        page.total
    );
    if page.is_out_of_range() {
        eprintln!("Requested page is past the last page");
    }
    println!("{}", serde_json::to_string_pretty(&page)?);

    Ok(())
}

async fn cmd_export(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(input).await?;
    let file = store.export_file();

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&file.filename));
    fs::write(&path, &file.content)?;
    eprintln!("Exported {} rows to {}", store.rows().len(), path.display());

    Ok(())
}

/// Import `input` into an empty store, failing on any import error.
async fn load_store(input: &Path) -> Result<TableStore, Box<dyn std::error::Error>> {
    let result: ImportResult = import_file(input).await;
    let mut store = TableStore::empty();
    if !result.apply_to(&mut store) {
        for err in &result.errors {
            eprintln!("  {}", err);
        }
        return Err(format!("{} import errors in {}", result.errors.len(), input.display()).into());
    }
    Ok(store)
}
