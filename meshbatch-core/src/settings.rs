use crate::env_file::EnvFile;
use std::collections::HashMap;

/// Comma-separated list of remote node ids
pub const REMOTE_NODES_VAR: &str = "MESHTASTIC_REMOTE_NODES";

/// Override for the external CLI executable
pub const MESHTASTIC_BIN_VAR: &str = "MESHTASTIC_BIN";

/// Executable looked up on `PATH` when nothing else is configured
pub const DEFAULT_PROGRAM: &str = "meshtastic";

/// Read-only view of environment variables
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolved configuration, built once at startup
///
/// Precedence is CLI override, then process environment, then env file, then
/// built-in default. A variable present in the environment always shadows
/// the file, even when it is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Raw value of `MESHTASTIC_REMOTE_NODES`, unparsed
    pub remote_nodes: Option<String>,
    /// External CLI to invoke
    pub program: String,
    /// Env file entries missing from the environment, sorted by key; child
    /// processes receive these on top of the inherited environment
    pub child_env: Vec<(String, String)>,
}

impl Settings {
    pub fn resolve(env: &impl EnvSource, file: &EnvFile) -> Self {
        let lookup = |key: &str| env.var(key).or_else(|| file.get(key).map(str::to_string));

        let mut child_env: Vec<(String, String)> = file
            .iter()
            .filter(|(key, _)| env.var(key).is_none())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        child_env.sort();

        Self {
            remote_nodes: lookup(REMOTE_NODES_VAR),
            program: lookup(MESHTASTIC_BIN_VAR).unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            child_env,
        }
    }

    /// Apply explicit command-line overrides on top of the resolved values
    pub fn with_overrides(mut self, remote_nodes: Option<String>, program: Option<String>) -> Self {
        if remote_nodes.is_some() {
            self.remote_nodes = remote_nodes;
        }
        if let Some(program) = program {
            self.program = program;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_file_fills_unset_variable() {
        let file = EnvFile::parse("MESHTASTIC_REMOTE_NODES=!aaa,!bbb\n");
        let settings = Settings::resolve(&env(&[]), &file);

        assert_eq!(settings.remote_nodes.as_deref(), Some("!aaa,!bbb"));
        assert_eq!(settings.program, DEFAULT_PROGRAM);
    }

    #[test]
    fn test_environment_beats_file() {
        let file = EnvFile::parse("MESHTASTIC_REMOTE_NODES=!aaa,!bbb\nMESHTASTIC_BIN=/file/bin\n");
        let settings = Settings::resolve(
            &env(&[(REMOTE_NODES_VAR, "!ccc"), (MESHTASTIC_BIN_VAR, "/env/bin")]),
            &file,
        );

        assert_eq!(settings.remote_nodes.as_deref(), Some("!ccc"));
        assert_eq!(settings.program, "/env/bin");
    }

    #[test]
    fn test_empty_environment_value_still_shadows_file() {
        let file = EnvFile::parse("MESHTASTIC_REMOTE_NODES=!aaa\n");
        let settings = Settings::resolve(&env(&[(REMOTE_NODES_VAR, "")]), &file);

        assert_eq!(settings.remote_nodes.as_deref(), Some(""));
    }

    #[test]
    fn test_child_env_holds_only_unset_file_keys() {
        let file = EnvFile::parse("FOO=from_file\nBAR=file_bar\nMESHTASTIC_REMOTE_NODES=!aaa\n");
        let settings = Settings::resolve(&env(&[("BAR", "from_env")]), &file);

        assert_eq!(
            settings.child_env,
            vec![
                ("FOO".to_string(), "from_file".to_string()),
                (REMOTE_NODES_VAR.to_string(), "!aaa".to_string()),
            ]
        );
    }

    #[test]
    fn test_cli_overrides_win() {
        let file = EnvFile::parse("MESHTASTIC_REMOTE_NODES=!aaa\n");
        let settings = Settings::resolve(&env(&[(REMOTE_NODES_VAR, "!bbb")]), &file)
            .with_overrides(Some("!ccc".to_string()), Some("./meshtastic".to_string()));

        assert_eq!(settings.remote_nodes.as_deref(), Some("!ccc"));
        assert_eq!(settings.program, "./meshtastic");

        let untouched = settings.clone().with_overrides(None, None);
        assert_eq!(untouched, settings);
    }
}
