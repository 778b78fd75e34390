use crate::cli::FindNodesCli;
use crate::output::{OutputFormat, print_json};
use crate::utils::{is_interactive, print_error, print_info, print_warning, spinner};
use anyhow::Result;
use colored::*;
use meshbatch_core::discovery::DiscoveryError;
use meshbatch_core::settings::EnvSource;
use meshbatch_core::{CommandRunner, NodeId, discover};
use serde_json::json;
use std::process::ExitCode;

pub async fn handle_find_nodes<R: CommandRunner>(
    cli: FindNodesCli,
    runner: &R,
    env: &impl EnvSource,
) -> Result<ExitCode> {
    let format = OutputFormat::from_json_flag(cli.json);
    let settings = super::load_settings(env, &cli.env_file, None, cli.meshtastic_bin);
    let excluded: Vec<NodeId> = cli.exclude.iter().map(NodeId::new).collect();

    if format == OutputFormat::Table {
        print_info("Querying the mesh for a list of all nodes...");
        print_info("This can take a few moments...");
    }

    let progress = (format == OutputFormat::Table && is_interactive())
        .then(|| spinner(format!("Running {program} --nodes", program = settings.program)));
    let result = discover(runner, &settings.program, &settings.child_env, &excluded).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let discovery = match result {
        Ok(discovery) => discovery,
        Err(DiscoveryError::ProgramNotFound { program }) => {
            print_error(&format!("The '{program}' command was not found."));
            eprintln!("Please ensure the Meshtastic Python CLI is installed and in your system's PATH.");
            return Ok(ExitCode::FAILURE);
        }
        Err(DiscoveryError::CommandFailed {
            program,
            exit_code,
            stderr,
        }) => {
            print_error(&format!(
                "Error executing '{program} --nodes' (exit code {code}):",
                code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ));
            eprintln!("{stderr}", stderr = stderr.trim_end());
            return Ok(ExitCode::FAILURE);
        }
        Err(e @ DiscoveryError::NoNodesFound { .. }) => {
            print_error(&e.to_string());
            eprintln!("Ensure your device is connected and can see other nodes on the mesh.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => {
            let export = discovery.export_line();
            print_json(&json!({
                "node_ids": &discovery.node_ids,
                "export": export,
            }))?;
        }
        OutputFormat::Table => {
            println!(
                "\n{title}",
                title = format!(
                    "Found {count} remote node ID(s):",
                    count = discovery.node_ids.len()
                )
                .bold()
                .green()
            );
            println!("{joined}", joined = discovery.joined());
            println!(
                "\n{hint}",
                hint = "To use these with meshtastic-all, run:".bold()
            );
            println!("{export}", export = discovery.export_line());

            if excluded.is_empty() {
                print_warning(
                    "The list may include your own radio's ID. Use --exclude to leave it out.",
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
