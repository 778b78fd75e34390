//! Node discovery by scraping `meshtastic --nodes`
//!
//! The external CLI prints a human-oriented table. Every `!`-prefixed hex
//! token in that output is treated as a node id, which includes the local
//! radio's own id.

use crate::node::{NodeId, NodeList};
use crate::runner::{CommandRunner, RunnerError};
use crate::settings::REMOTE_NODES_VAR;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Flag that makes the external CLI list known nodes
pub const LIST_NODES_FLAG: &str = "--nodes";

const NODE_ID_PATTERN: &str = r"![0-9a-fA-F]+";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("the '{program}' command was not found")]
    ProgramNotFound { program: String },

    #[error("'{program} --nodes' exited with {}", describe_exit(.exit_code))]
    CommandFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("no remote node IDs found in the output of '{program} --nodes'")]
    NoNodesFound { program: String },

    #[error(transparent)]
    Io(RunnerError),

    #[error("failed to compile node id pattern `{pattern}`: {source}")]
    RegexCompile {
        pattern: &'static str,
        #[source]
        source: regex::Error,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match *exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Extracts node ids from free-form text
#[derive(Debug, Clone)]
pub struct NodeIdScanner {
    pattern: Regex,
}

impl NodeIdScanner {
    pub fn new() -> Result<Self, DiscoveryError> {
        let pattern = Regex::new(NODE_ID_PATTERN).map_err(|source| DiscoveryError::RegexCompile {
            pattern: NODE_ID_PATTERN,
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Every match in order of appearance, duplicates included
    pub fn scan(&self, text: &str) -> Vec<NodeId> {
        self.pattern
            .find_iter(text)
            .map(|m| NodeId::new(m.as_str()))
            .collect()
    }
}

/// Node ids found on the mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub node_ids: NodeList,
}

impl Discovery {
    pub fn joined(&self) -> String {
        self.node_ids.joined()
    }

    /// Shell line that exports the ids for the dispatcher
    pub fn export_line(&self) -> String {
        format!("export {REMOTE_NODES_VAR}=\"{joined}\"", joined = self.joined())
    }

    /// Drop every occurrence of the given ids, ignoring hex digit case
    pub fn excluding(self, excluded: &[NodeId]) -> Self {
        if excluded.is_empty() {
            return self;
        }
        let kept: Vec<NodeId> = self
            .node_ids
            .iter()
            .filter(|id| {
                !excluded
                    .iter()
                    .any(|x| x.as_str().eq_ignore_ascii_case(id.as_str()))
            })
            .cloned()
            .collect();
        Self {
            node_ids: NodeList::from(kept),
        }
    }
}

/// Run `<program> --nodes` and collect the node ids it prints
///
/// Ids listed in `excluded` are dropped before the empty check, so excluding
/// every discovered node is reported as [`DiscoveryError::NoNodesFound`].
/// `envs` are passed to the child on top of the inherited environment.
pub async fn discover<R: CommandRunner>(
    runner: &R,
    program: &str,
    envs: &[(String, String)],
    excluded: &[NodeId],
) -> Result<Discovery, DiscoveryError> {
    let scanner = NodeIdScanner::new()?;

    info!("Querying the mesh for a list of all nodes");
    let output = runner
        .run(program, &[LIST_NODES_FLAG.to_string()], envs)
        .await
        .map_err(|e| match e {
            RunnerError::NotFound { program } => DiscoveryError::ProgramNotFound { program },
            other => DiscoveryError::Io(other),
        })?;

    if !output.success() {
        return Err(DiscoveryError::CommandFailed {
            program: program.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    let node_ids = scanner.scan(&output.stdout);
    debug!("Matched {count} node id(s)", count = node_ids.len());

    let discovery = Discovery {
        node_ids: NodeList::from(node_ids),
    }
    .excluding(excluded);

    if discovery.node_ids.is_empty() {
        return Err(DiscoveryError::NoNodesFound {
            program: program.to_string(),
        });
    }
    Ok(discovery)
}
