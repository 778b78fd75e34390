use anyhow::Result;
use colored::*;
use comfy_table::{Cell, Color, Table};
use meshbatch_core::{DispatchReport, NodeStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Table }
    }
}

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{json}", json = serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn status_cell(status: &NodeStatus) -> Cell {
    let color = match status {
        NodeStatus::Succeeded => Color::Green,
        NodeStatus::Failed { .. } => Color::Red,
        NodeStatus::Errored { .. } => Color::Yellow,
    };
    Cell::new(status).fg(color)
}

fn exit_code_cell(status: &NodeStatus) -> Cell {
    match status {
        NodeStatus::Succeeded => Cell::new("0"),
        NodeStatus::Failed {
            exit_code: Some(code),
        } => Cell::new(code),
        NodeStatus::Failed { exit_code: None } => Cell::new("signal"),
        NodeStatus::Errored { .. } => Cell::new("N/A"),
    }
}

/// Per-node table followed by the aggregate counts
pub fn print_summary(report: &DispatchReport) {
    let separator = "==================================================".bold();

    println!("{separator}");
    println!("{title}", title = "Summary:".bold().cyan());

    let mut table = create_table();
    table.set_header(vec![
        Cell::new("Node ID"),
        Cell::new("Node Num"),
        Cell::new("Status"),
        Cell::new("Exit Code"),
        Cell::new("Time"),
    ]);
    for outcome in &report.outcomes {
        table.add_row(vec![
            Cell::new(&outcome.node),
            Cell::new(
                outcome
                    .node
                    .num()
                    .map(|num| num.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            status_cell(&outcome.status),
            exit_code_cell(&outcome.status),
            Cell::new(humantime::format_duration(std::time::Duration::from_millis(
                outcome.duration_ms,
            ))),
        ]);
    }
    println!("{table}");

    println!("Processed {total} node(s).", total = report.total());
    println!(
        "Successfully executed commands for {count} node(s).",
        count = report.succeeded.to_string().green()
    );
    let failed = if report.failed > 0 {
        report.failed.to_string().red()
    } else {
        report.failed.to_string().normal()
    };
    println!("Failed to execute commands for {failed} node(s).");
    println!(
        "Total time: {elapsed}",
        elapsed = humantime::format_duration(report.duration())
    );
    println!("{separator}");
}
