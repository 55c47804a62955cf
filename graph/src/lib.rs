pub mod config;
pub mod core;
pub mod error;
pub mod git_backend;
pub mod input;
pub mod optimise;
pub mod prefix;
pub mod render;

#[cfg(test)]
mod testing;

pub use config::{GraphConfig, SourceConfig};
pub use core::{Commit, CommitId, Ref, RefCollection, RefKind, Repository, RepositoryStats};
pub use error::{GraphError, Result};
pub use git_backend::GitWalker;
pub use input::{LineSource, MemoryLines};
pub use optimise::{optimize, Optimiser};
pub use prefix::PrefixIndex;
pub use render::DotRenderer;
