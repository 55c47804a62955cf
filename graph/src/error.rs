use crate::core::CommitId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid ref syntax: {line}")]
    MalformedLine { line: String },

    #[error("Invalid commit id: {text:?}")]
    InvalidId { text: String },

    #[error("No such commit: {}", join_ids(.ids))]
    MissingCommits { ids: Vec<CommitId> },

    #[error("Ref '{name}' points at unknown commit {id}")]
    DanglingRef { name: String, id: CommitId },

    #[error("Ambiguous prefix '{prefix}' matches {matches} commits")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

fn join_ids(ids: &[CommitId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
