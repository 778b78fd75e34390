use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default dotfile consulted at startup
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parsed `KEY=VALUE` pairs from a dotfile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Parse dotfile contents
    ///
    /// Blank lines, `#` comments and lines without `=` are skipped. When a key
    /// repeats, its first value is kept.
    pub fn parse(contents: &str) -> Self {
        let mut values = HashMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                warn!("Ignoring line {line_no} in env file: empty key", line_no = index + 1);
                continue;
            }

            values
                .entry(key.to_string())
                .or_insert_with(|| unquote(value.trim()).to_string());
        }

        Self { values }
    }

    /// Read and parse a dotfile, failing only on I/O errors
    ///
    /// A file that does not exist parses as empty.
    pub fn read(path: &Path) -> Result<Self, EnvFileError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No env file at {path}", path = path.display());
                Ok(Self::default())
            }
            Err(source) => Err(EnvFileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Best-effort load: read errors are logged and yield an empty file
    pub fn load(path: &Path) -> Self {
        Self::read(path).unwrap_or_else(|e| {
            warn!("Could not parse env file: {e}");
            Self::default()
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All key/value pairs, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
