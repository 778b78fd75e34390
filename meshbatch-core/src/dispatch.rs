//! Sequential fan-out of one remote admin command to many nodes

use crate::node::{NodeId, NodeList};
use crate::runner::{CommandRunner, RunnerError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use strum::Display;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Flag selecting the target node
pub const DEST_FLAG: &str = "--dest";

/// Flag marking the command as a remote admin request
pub const REMOTE_ADMIN_FLAG: &str = "--remoteadmin";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("the '{program}' command was not found. Is it installed and in your PATH?")]
    ProgramNotFound { program: String },
}

/// What to run and against which nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    pub program: String,
    pub nodes: NodeList,
    pub forwarded: Vec<String>,
    /// Extra environment for every invocation
    pub env: Vec<(String, String)>,
}

impl DispatchPlan {
    pub fn new(program: impl Into<String>, nodes: NodeList, forwarded: Vec<String>) -> Self {
        Self {
            program: program.into(),
            nodes,
            forwarded,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    /// Arguments passed to the program for one node
    pub fn args_for(&self, node: &NodeId) -> Vec<String> {
        let mut args = Vec::with_capacity(3 + self.forwarded.len());
        args.push(DEST_FLAG.to_string());
        args.push(node.to_string());
        args.push(REMOTE_ADMIN_FLAG.to_string());
        args.extend(self.forwarded.iter().cloned());
        args
    }

    /// Full command line for one node, program first
    pub fn argv_for(&self, node: &NodeId) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        argv.extend(self.args_for(node));
        argv
    }
}

/// Outcome classification for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display)]
#[serde(tag = "status", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeStatus {
    Succeeded,
    Failed { exit_code: Option<i32> },
    Errored { message: String },
}

impl NodeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Result of running the command against one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOutcome {
    pub node: NodeId,
    #[serde(flatten)]
    pub status: NodeStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

/// Progress notifications emitted while dispatching
#[derive(Debug)]
pub enum DispatchEvent<'a> {
    Starting { node: &'a NodeId, argv: &'a [String] },
    Finished(&'a NodeOutcome),
}

/// Aggregate result of a dispatch run
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub forwarded: Vec<String>,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<NodeOutcome>,
}

impl DispatchReport {
    fn new(forwarded: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            forwarded,
            succeeded: 0,
            failed: 0,
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, outcome: NodeOutcome) {
        if outcome.status.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run the plan against every node in order, one at a time
///
/// A missing executable aborts the whole run. Any other runner error is
/// recorded as a failure for that node and the loop moves on.
pub async fn dispatch<R, F>(
    runner: &R,
    plan: &DispatchPlan,
    mut observe: F,
) -> Result<DispatchReport, DispatchError>
where
    R: CommandRunner,
    F: FnMut(DispatchEvent<'_>),
{
    let run_start = Instant::now();
    let mut report = DispatchReport::new(plan.forwarded.clone());

    info!(
        "Dispatching to {count} node(s) with run id {run_id}",
        count = plan.nodes.len(),
        run_id = report.run_id
    );

    for node in &plan.nodes {
        let argv = plan.argv_for(node);
        observe(DispatchEvent::Starting { node, argv: &argv });

        let node_start = Instant::now();
        let outcome = match runner.run(&plan.program, &argv[1..], &plan.env).await {
            Ok(output) => {
                let status = if output.success() {
                    NodeStatus::Succeeded
                } else {
                    NodeStatus::Failed {
                        exit_code: output.exit_code,
                    }
                };
                NodeOutcome {
                    node: node.clone(),
                    status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    duration_ms: elapsed_ms(node_start),
                }
            }
            Err(RunnerError::NotFound { program }) => {
                return Err(DispatchError::ProgramNotFound { program });
            }
            Err(e) => {
                warn!("Unexpected error while processing node {node}: {e}");
                NodeOutcome {
                    node: node.clone(),
                    status: NodeStatus::Errored {
                        message: e.to_string(),
                    },
                    stdout: String::new(),
                    stderr: String::new(),
                    duration_ms: elapsed_ms(node_start),
                }
            }
        };

        debug!("Node {node} finished: {status}", status = outcome.status);
        observe(DispatchEvent::Finished(&outcome));
        report.record(outcome);
    }

    report.duration_ms = elapsed_ms(run_start);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_status_display_matches_json_tag() -> Result<()> {
        let statuses = [
            NodeStatus::Succeeded,
            NodeStatus::Failed { exit_code: Some(2) },
            NodeStatus::Errored {
                message: "boom".to_string(),
            },
        ];
        for status in statuses {
            let json = serde_json::to_value(&status)?;
            assert_eq!(json["status"], status.to_string());
        }
        Ok(())
    }
}
