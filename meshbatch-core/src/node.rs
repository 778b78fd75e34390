use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix carried by every canonical node identifier
pub const NODE_ID_PREFIX: char = '!';

/// A mesh node identifier such as `!a1b2c3d4`
///
/// Construction always normalizes the value to carry the `!` prefix. The body
/// is not validated: whatever the operator configured is forwarded to the
/// external CLI as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build a node id, prepending `!` if it is missing
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        if raw.starts_with(NODE_ID_PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{NODE_ID_PREFIX}{raw}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric node number, if the body is hex that fits in 32 bits
    pub fn num(&self) -> Option<u32> {
        let body = self.0.strip_prefix(NODE_ID_PREFIX)?;
        u32::from_str_radix(body, 16).ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

/// Reasons a configured node list cannot be used
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeListError {
    #[error("environment variable {var} is not set or is empty")]
    Unset { var: &'static str },

    #[error("no node IDs found in {var} after parsing")]
    Empty { var: &'static str },
}

/// Ordered list of target nodes
///
/// Order and duplicates are kept exactly as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeList(Vec<NodeId>);

impl NodeList {
    /// Parse a comma-separated list, trimming entries and dropping empty ones
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(NodeId::new)
                .collect(),
        )
    }

    /// Parse the configured value of `var`, rejecting unset, empty and blank lists
    pub fn from_setting(raw: Option<&str>, var: &'static str) -> Result<Self, NodeListError> {
        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => return Err(NodeListError::Unset { var }),
        };

        let list = Self::parse(raw);
        if list.is_empty() {
            return Err(NodeListError::Empty { var });
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.0.iter()
    }

    /// Comma-joined form, suitable for `MESHTASTIC_REMOTE_NODES`
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Vec<NodeId>> for NodeList {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAR: &str = "MESHTASTIC_REMOTE_NODES";

    #[test]
    fn test_prefix_added_when_missing() {
        assert_eq!(NodeId::new("abc123").as_str(), "!abc123");
        assert_eq!(NodeId::new("!abc123").as_str(), "!abc123");
    }

    #[test]
    fn test_node_num() {
        assert_eq!(NodeId::new("!a1b2c3d4").num(), Some(0xa1b2c3d4));
        assert_eq!(NodeId::new("!zz").num(), None);
        assert_eq!(NodeId::new("!123456789").num(), None);
    }

    #[test]
    fn test_parse_trims_and_normalizes() {
        let list = NodeList::parse(" !aaa , bbb,,  ,!aaa ");
        let ids: Vec<&str> = list.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["!aaa", "!bbb", "!aaa"]);
        assert_eq!(list.joined(), "!aaa,!bbb,!aaa");
    }

    #[test]
    fn test_from_setting_rejects_unset_and_blank() {
        assert_eq!(
            NodeList::from_setting(None, VAR),
            Err(NodeListError::Unset { var: VAR })
        );
        assert_eq!(
            NodeList::from_setting(Some(""), VAR),
            Err(NodeListError::Unset { var: VAR })
        );
        assert_eq!(
            NodeList::from_setting(Some(" , ,"), VAR),
            Err(NodeListError::Empty { var: VAR })
        );
    }
}
