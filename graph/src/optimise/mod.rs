//! Graph simplification: chain and loop grafts, then pruning

pub mod graft;
pub mod grafter;
pub mod pruner;

pub use graft::Graft;
pub use grafter::Grafter;
pub use pruner::prune_commits;

use crate::config::GraphConfig;
use crate::core::{RefCollection, Repository};
use crate::error::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Builds simplified, topologically similar repositories
#[derive(Debug, Clone)]
pub struct Optimiser {
    max_passes: usize,
}

impl Optimiser {
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            max_passes: config.max_passes,
        }
    }

    /// Create a new simplified but topologically similar repository
    ///
    /// Chain and loop passes alternate until a round adds no graft. The
    /// grafted edges are rebuilt into fresh commits and everything no ref
    /// still needs is pruned. `repo` is left untouched.
    pub fn optimize(&self, repo: &Repository) -> Result<Repository> {
        let whitelist: HashSet<_> = repo.whitelist();
        let mut grafter = Grafter::new(repo.commits(), repo.refs().commits())?;

        grafter.graft_chains();
        let mut round = 0;
        loop {
            if round == self.max_passes {
                warn!(round, "graft passes did not settle, stopping early");
                break;
            }
            round += 1;

            let loops = grafter.graft_loops();
            let chains = grafter.graft_chains();
            debug!(round, loops, chains, "graft round");
            if loops == 0 && chains == 0 {
                break;
            }
        }

        let grafts = grafter.grafts().len();
        let mut commits = grafter.commit_map()?;
        let pruned = prune_commits(&mut commits, &whitelist);

        let refs: RefCollection = repo
            .refs()
            .iter()
            .filter(|r| commits.contains_key(&r.commit))
            .cloned()
            .collect();

        let optimised = Repository::new(commits, refs)?.with_abbrev_min_len(repo.abbrev_min_len());
        info!(
            before = repo.len(),
            after = optimised.len(),
            grafts,
            pruned,
            rounds = round,
            "optimised repository"
        );
        Ok(optimised)
    }
}

impl Default for Optimiser {
    fn default() -> Self {
        Self::new(&GraphConfig::default())
    }
}

/// Optimise with the default settings
pub fn optimize(repo: &Repository) -> Result<Repository> {
    Optimiser::default().optimize(repo)
}
