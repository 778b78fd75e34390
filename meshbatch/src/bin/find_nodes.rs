use clap::Parser;
use meshbatch::cli::FindNodesCli;
use meshbatch::commands::handle_find_nodes;
use meshbatch::setup_logging;
use meshbatch::utils::print_error;
use meshbatch_core::{ProcessEnv, SystemRunner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let cli = FindNodesCli::parse();

    // Set up logging
    setup_logging(cli.verbose, cli.debug);

    match handle_find_nodes(cli, &SystemRunner, &ProcessEnv).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("An unexpected error occurred: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
