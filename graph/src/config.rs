use crate::error::Result;
use crate::prefix::DEFAULT_MIN_LEN;
use serde::Deserialize;
use std::path::Path;

/// Engine settings, read from a TOML file
///
/// ```toml
/// abbrev_min_len = 8
/// max_passes = 32
///
/// [source]
/// remote = "upstream"
/// local_branches = false
/// include_tags = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Minimum length of an abbreviated commit id
    pub abbrev_min_len: usize,
    /// Upper bound on alternating loop/chain rounds
    pub max_passes: usize,
    pub source: SourceConfig,
}

/// Which refs the git backend lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Remote whose tracking branches are listed
    pub remote: String,
    /// List local branches instead of remote-tracking ones
    pub local_branches: bool,
    pub include_tags: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            abbrev_min_len: DEFAULT_MIN_LEN,
            max_passes: 64,
            source: SourceConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            local_branches: false,
            include_tags: true,
        }
    }
}

impl GraphConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(GraphConfig::from_toml_str("").unwrap(), GraphConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = GraphConfig::from_toml_str(
            r#"
abbrev_min_len = 10

[source]
remote = "upstream"
"#,
        )
        .unwrap();

        assert_eq!(config.abbrev_min_len, 10);
        assert_eq!(config.max_passes, 64);
        assert_eq!(config.source.remote, "upstream");
        assert!(config.source.include_tags);
        assert!(!config.source.local_branches);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = GraphConfig::from_toml_str("abbrev = 3").unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_passes = 4").unwrap();
        writeln!(file, "[source]").unwrap();
        writeln!(file, "local_branches = true").unwrap();

        let config = GraphConfig::load(file.path()).unwrap();
        assert_eq!(config.max_passes, 4);
        assert!(config.source.local_branches);
    }

    #[test]
    fn test_missing_file() {
        let err = GraphConfig::load(Path::new("/nonexistent/gitgraph.toml")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
