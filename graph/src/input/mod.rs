//! Raw line feeds and their grammar
//!
//! Commit lines are `<id> [<parent> [<merge-parent>]]`, ref lines are
//! `<commit-id> <name>`. Where the lines come from is up to the
//! [`LineSource`] implementation.

use crate::core::{CommitId, EdgeTuple};
use crate::error::{GraphError, Result};
use tracing::debug;

/// Provider of the three line feeds a repository is built from
pub trait LineSource {
    fn commit_lines(&self) -> Result<Vec<String>>;
    fn branch_lines(&self) -> Result<Vec<String>>;
    fn tag_lines(&self) -> Result<Vec<String>>;
}

/// Line source backed by in-memory text, one line per entry
#[derive(Debug, Clone, Default)]
pub struct MemoryLines {
    commits: Vec<String>,
    branches: Vec<String>,
    tags: Vec<String>,
}

impl MemoryLines {
    pub fn new(commits: &str, branches: &str, tags: &str) -> Self {
        Self {
            commits: split_lines(commits),
            branches: split_lines(branches),
            tags: split_lines(tags),
        }
    }
}

impl LineSource for MemoryLines {
    fn commit_lines(&self) -> Result<Vec<String>> {
        Ok(self.commits.clone())
    }

    fn branch_lines(&self) -> Result<Vec<String>> {
        Ok(self.branches.clone())
    }

    fn tag_lines(&self) -> Result<Vec<String>> {
        Ok(self.tags.clone())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a commit line into an edge tuple, keeping at most two parents
pub fn parse_commit_line(line: &str) -> Result<EdgeTuple> {
    let mut fields = line.split_whitespace();
    let mut ids = EdgeTuple::new();
    for field in fields.by_ref().take(3) {
        ids.push(CommitId::from_hex(field)?);
    }
    if ids.is_empty() {
        return Err(GraphError::MalformedLine {
            line: line.to_string(),
        });
    }

    let dropped = fields.count();
    if dropped > 0 {
        debug!(commit = %ids[0], dropped, "ignoring octopus parents");
    }
    Ok(ids)
}

/// Parse a ref line into the commit id and ref name
pub fn parse_ref_line(line: &str) -> Result<(CommitId, String)> {
    let (id, name) = line.split_once(' ').ok_or_else(|| GraphError::MalformedLine {
        line: line.to_string(),
    })?;
    Ok((CommitId::from_hex(id)?, name.to_string()))
}
