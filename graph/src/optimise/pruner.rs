use crate::core::{CommitId, CommitMap, MultiMap};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Remove every commit that is neither whitelisted nor has a child left
///
/// Starts from the current tips and walks down first parents, dropping
/// commits until it reaches one that is still needed. Merge parents of
/// dropped commits are queued as new candidate tips. Returns the number of
/// commits removed.
pub fn prune_commits(commits: &mut CommitMap, whitelist: &HashSet<CommitId>) -> usize {
    // one entry per parent edge
    let mut children: MultiMap<CommitId, CommitId> = commits
        .values()
        .flat_map(|c| c.parents().map(move |p| (p, c.id)))
        .collect();

    let mut dangling: VecDeque<CommitId> = commits
        .keys()
        .filter(|id| !children.contains_key(id))
        .copied()
        .collect();

    let mut removed = 0;
    while let Some(tip) = dangling.pop_front() {
        let mut next = Some(tip);
        while let Some(id) = next {
            if whitelist.contains(&id) || children.contains_key(&id) {
                break;
            }
            let Some(commit) = commits.remove(&id) else {
                break;
            };
            removed += 1;

            for parent in commit.parents() {
                children.remove_value(&parent, &id);
            }
            if let Some(merge_parent) = commit.merge_parent {
                dangling.push_back(merge_parent);
            }
            next = commit.parent;
        }
    }

    debug!(removed, remaining = commits.len(), "pruned commits");
    removed
}
