use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use soul_link::core::config::{self, CliOverrides};
use soul_link::core::store::GridStore;
use soul_link::tui;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "soul-link", about = "Browse and prune a game list in the terminal")]
struct Args {
    /// Grid to edit (.csv or .json); the header is the first row
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Log file (default: soul-link.log in the current directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config =
        config::load_config().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let config = config::resolve(
        &file_config,
        &CliOverrides {
            data_file: args.data,
            log_file: args.log_file,
        },
    );

    // File logger: the terminal belongs to the table view
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    log::info!("Soul Link starting up");

    let data_file = config.data_file.clone().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "no data file: pass --data, set SOUL_LINK_DATA, or set general.data_file in ~/.soul_link/config.toml",
        )
    })?;
    let store = GridStore::open(data_file).map_err(io::Error::other)?;
    let grid = store.load().map_err(io::Error::other)?;
    log::info!(
        "Loaded {} data rows from {}",
        grid.data_len(),
        store.path().display()
    );

    tui::run(grid, store.into_callback(), &config).await
}
