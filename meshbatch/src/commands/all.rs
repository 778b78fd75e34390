use crate::cli::AllCli;
use crate::output::{OutputFormat, print_json, print_summary};
use crate::utils::{is_interactive, print_error, print_info, print_success, spinner};
use anyhow::Result;
use colored::*;
use indicatif::ProgressBar;
use meshbatch_core::dispatch::DispatchError;
use meshbatch_core::settings::{EnvSource, REMOTE_NODES_VAR};
use meshbatch_core::{
    CommandRunner, DispatchEvent, DispatchPlan, NodeId, NodeList, NodeOutcome, NodeStatus,
    dispatch,
};
use std::process::ExitCode;

const SEPARATOR: &str = "--------------------------------------------------";

fn print_node_list_usage() {
    eprintln!("Please set it in your shell or create a .env file with the following format:");
    eprintln!("Example .env file content:");
    eprintln!("{REMOTE_NODES_VAR}=!node1id,!node2id,node3id");
}

fn print_args_usage() {
    println!("Usage: meshtastic-all [OPTIONS] <MESHTASTIC_ARGS>...");
    println!(
        "Example: meshtastic-all --set lora.modem_preset 'MEDIUM_FAST' --set lora.region 'US'"
    );
    println!("This command requires arguments to pass to the meshtastic CLI.");
}

fn print_starting(node: &NodeId, argv: &[String]) {
    println!("{SEPARATOR}");
    println!("Executing for node: {node}", node = node.to_string().bold());
    println!("Command: {command}", command = argv.join(" "));
    println!("{SEPARATOR}");
}

fn print_finished(outcome: &NodeOutcome) {
    let stdout = outcome.stdout.trim();
    if !stdout.is_empty() {
        println!("Output:\n{stdout}");
    }
    let stderr = outcome.stderr.trim();
    if !stderr.is_empty() {
        eprintln!("Errors/Warnings:\n{stderr}");
    }

    let node = &outcome.node;
    match &outcome.status {
        NodeStatus::Succeeded => {
            print_success(&format!("Successfully executed command for node {node}."));
        }
        NodeStatus::Failed {
            exit_code: Some(code),
        } => {
            print_error(&format!(
                "Command for node {node} failed with exit code {code}."
            ));
        }
        NodeStatus::Failed { exit_code: None } => {
            print_error(&format!(
                "Command for node {node} was terminated without an exit code."
            ));
        }
        NodeStatus::Errored { message } => {
            print_error(&format!(
                "An unexpected error occurred while processing node {node}: {message}"
            ));
        }
    }
    println!();
}

pub async fn handle_all<R: CommandRunner>(
    cli: AllCli,
    runner: &R,
    env: &impl EnvSource,
) -> Result<ExitCode> {
    let format = OutputFormat::from_json_flag(cli.json);
    let settings = super::load_settings(env, &cli.env_file, cli.remote_nodes, cli.meshtastic_bin);

    let nodes = match NodeList::from_setting(settings.remote_nodes.as_deref(), REMOTE_NODES_VAR) {
        Ok(nodes) => nodes,
        Err(e) => {
            print_error(&e.to_string());
            print_node_list_usage();
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.args.is_empty() {
        print_args_usage();
        return Ok(ExitCode::FAILURE);
    }

    let plan = DispatchPlan::new(settings.program, nodes, cli.args).with_env(settings.child_env);

    if format == OutputFormat::Table {
        print_info(&format!(
            "Found {count} remote node(s) to target: {list}",
            count = plan.nodes.len(),
            list = plan
                .nodes
                .iter()
                .map(NodeId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        print_info(&format!(
            "Will attempt to send arguments: {args}\n",
            args = plan.forwarded.join(" ")
        ));
    }

    let interactive = format == OutputFormat::Table && is_interactive();
    let mut progress: Option<ProgressBar> = None;

    let result = dispatch(runner, &plan, |event| {
        if format == OutputFormat::Json {
            return;
        }
        match event {
            DispatchEvent::Starting { node, argv } => {
                print_starting(node, argv);
                if interactive {
                    progress = Some(spinner(format!("Waiting for {node}...")));
                }
            }
            DispatchEvent::Finished(outcome) => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }
                print_finished(outcome);
            }
        }
    })
    .await;

    if let Some(pb) = progress.take() {
        pb.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(e @ DispatchError::ProgramNotFound { .. }) => {
            print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_summary(&report),
    }

    Ok(if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
