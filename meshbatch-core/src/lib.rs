//! Core library for meshbatch
//!
//! Discovers Meshtastic node ids and fans remote admin commands out to many
//! nodes by driving the external `meshtastic` CLI, one node at a time.

pub mod discovery;
pub mod dispatch;
pub mod env_file;
pub mod node;
pub mod runner;
pub mod settings;

// Re-export commonly used types
pub use anyhow::Result;
pub use discovery::{Discovery, DiscoveryError, discover};
pub use dispatch::{DispatchEvent, DispatchPlan, DispatchReport, NodeOutcome, NodeStatus, dispatch};
pub use env_file::EnvFile;
pub use node::{NodeId, NodeList, NodeListError};
pub use runner::{CommandOutput, CommandRunner, RunnerError, SystemRunner};
pub use settings::{ProcessEnv, Settings};
