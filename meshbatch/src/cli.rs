use clap::Parser;
use meshbatch_core::env_file::DEFAULT_ENV_FILE;
use std::path::PathBuf;

/// Discover node IDs visible to the locally connected radio
#[derive(Parser, Debug)]
#[command(name = "meshtastic-find-nodes")]
#[command(author, version, about, long_about = None)]
pub struct FindNodesCli {
    /// Node IDs to leave out of the result, such as your own radio (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// meshtastic executable to run (overrides MESHTASTIC_BIN)
    #[arg(long)]
    pub meshtastic_bin: Option<String>,

    /// Env file consulted for settings not already in the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Output in JSON format
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Run one meshtastic remote admin command against every configured node
///
/// Options must come before the forwarded arguments. Everything from the
/// first unrecognized argument on (or everything after `--`) is passed to
/// `meshtastic --dest <id> --remoteadmin` verbatim.
#[derive(Parser, Debug)]
#[command(name = "meshtastic-all")]
#[command(author, version, about, long_about)]
pub struct AllCli {
    /// Env file consulted for settings not already in the environment
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Comma-separated node IDs (overrides MESHTASTIC_REMOTE_NODES)
    #[arg(long)]
    pub remote_nodes: Option<String>,

    /// meshtastic executable to run (overrides MESHTASTIC_BIN)
    #[arg(long)]
    pub meshtastic_bin: Option<String>,

    /// Print the run report as JSON instead of per-node output
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Arguments forwarded to meshtastic for each node
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "MESHTASTIC_ARGS"
    )]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_forwarded_args_keep_their_flags() -> Result<()> {
        let cli = AllCli::try_parse_from([
            "meshtastic-all",
            "--json",
            "--set",
            "lora.modem_preset",
            "MEDIUM_FAST",
            "--json",
        ])?;

        assert!(cli.json);
        assert_eq!(
            cli.args,
            vec!["--set", "lora.modem_preset", "MEDIUM_FAST", "--json"]
        );
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        Ok(())
    }

    #[test]
    fn test_double_dash_forwards_everything() -> Result<()> {
        let cli = AllCli::try_parse_from(["meshtastic-all", "--", "--verbose", "--reboot"])?;

        assert!(!cli.verbose);
        assert_eq!(cli.args, vec!["--verbose", "--reboot"]);
        Ok(())
    }

    #[test]
    fn test_no_forwarded_args_parses() -> Result<()> {
        let cli = AllCli::try_parse_from(["meshtastic-all", "--remote-nodes", "!aaa"])?;

        assert!(cli.args.is_empty());
        assert_eq!(cli.remote_nodes.as_deref(), Some("!aaa"));
        Ok(())
    }

    #[test]
    fn test_find_nodes_exclude_list() -> Result<()> {
        let cli = FindNodesCli::try_parse_from(["meshtastic-find-nodes", "-x", "!aaa,bbb", "-j"])?;

        assert_eq!(cli.exclude, vec!["!aaa", "bbb"]);
        assert!(cli.json);
        assert!(cli.meshtastic_bin.is_none());
        Ok(())
    }
}
