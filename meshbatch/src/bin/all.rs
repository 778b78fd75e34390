use clap::Parser;
use meshbatch::cli::AllCli;
use meshbatch::commands::handle_all;
use meshbatch::setup_logging;
use meshbatch::utils::print_error;
use meshbatch_core::{ProcessEnv, SystemRunner};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = AllCli::parse();

    // --debug is left to the forwarded meshtastic arguments; use RUST_LOG instead
    setup_logging(cli.verbose, false);

    match handle_all(cli, &SystemRunner, &ProcessEnv).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
