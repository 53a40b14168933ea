//! # shoebox
//!
//! ```bash
//! shoebox init-db
//! shoebox add -l A-01 -p 2024-04-01 -m DD1391-100 -n "Dunk Low" -v KREAM --price 139000
//! shoebox list -k dunk --sort-by price --asc
//! shoebox sell --barcode 8801234567890
//! shoebox import-csv stock.csv
//! ```

use std::process::ExitCode;

use clap::Parser;

use shoebox_cli::cli::Cli;
use shoebox_cli::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match shoebox_cli::load_config(&cli) {
        Ok(config) => config,
        Err(e) => return report(e),
    };
    shoebox_cli::init_tracing(&config.log_level, cli.verbose);

    match shoebox_cli::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn report(error: CliError) -> ExitCode {
    eprintln!("❌ {error}");
    ExitCode::from(error.exit_code())
}
