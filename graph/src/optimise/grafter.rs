use super::graft::Graft;
use crate::core::{build_commit_map, Commit, CommitId, CommitMap, EdgeTuple};
use crate::error::{GraphError, Result};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Collects grafts that simplify a commit graph without touching it
///
/// Every query goes through the grafted view: a commit's parents are the
/// graft's parents when one exists, the commit's own otherwise.
pub struct Grafter<'a> {
    commits: &'a CommitMap,
    /// Whitelist in ref order, so passes run deterministically
    seeds: Vec<CommitId>,
    whitelist: HashSet<CommitId>,
    grafts: HashMap<CommitId, Graft>,
}

impl<'a> Grafter<'a> {
    pub fn new<I>(commits: &'a CommitMap, whitelist: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommitId>,
    {
        let mut seeds = Vec::new();
        let mut set = HashSet::new();
        for id in whitelist {
            if !commits.contains_key(&id) {
                return Err(GraphError::Invariant(format!("whitelisted commit {} is not in the graph", id)));
            }
            if set.insert(id) {
                seeds.push(id);
            }
        }

        Ok(Self {
            commits,
            seeds,
            whitelist: set,
            grafts: HashMap::new(),
        })
    }

    pub fn grafts(&self) -> &HashMap<CommitId, Graft> {
        &self.grafts
    }

    /// Record a graft directly; every id it names must be in the graph
    pub fn insert(&mut self, graft: Graft) -> Result<()> {
        if let Some(unknown) = graft.ids().iter().find(|id| !self.commits.contains_key(id)) {
            return Err(GraphError::Invariant(format!("graft names unknown commit {}", unknown)));
        }
        self.grafts.insert(graft.id(), graft);
        Ok(())
    }

    fn parent(&self, id: CommitId) -> Option<CommitId> {
        match self.grafts.get(&id) {
            Some(graft) => graft.parent(),
            None => self.commits.get(&id).and_then(|c| c.parent),
        }
    }

    fn merge_parent(&self, id: CommitId) -> Option<CommitId> {
        match self.grafts.get(&id) {
            Some(graft) => graft.merge_parent(),
            None => self.commits.get(&id).and_then(|c| c.merge_parent),
        }
    }

    fn parents(&self, id: CommitId) -> SmallVec<[CommitId; 2]> {
        self.parent(id).into_iter().chain(self.merge_parent(id)).collect()
    }

    fn ids(&self, commit: &Commit) -> EdgeTuple {
        match self.grafts.get(&commit.id) {
            Some(graft) => graft.ids().clone(),
            None => commit.ids(),
        }
    }

    /// Store a graft; true when it is new or differs from the previous one
    fn add_graft(&mut self, graft: Graft) -> bool {
        if self.grafts.get(&graft.id()) == Some(&graft) {
            return false;
        }
        debug!(commit = %graft.id(), parents = ?graft.parents(), "graft");
        self.grafts.insert(graft.id(), graft);
        true
    }

    /// Child counts of every commit reachable from the whitelist
    fn live_children(&self) -> HashMap<CommitId, usize> {
        let mut counts: HashMap<CommitId, usize> = HashMap::new();
        let mut visited: HashSet<CommitId> = HashSet::new();
        let mut queue: VecDeque<CommitId> = self.seeds.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let mut parents = self.parents(id);
            parents.dedup();
            for parent in parents {
                *counts.entry(parent).or_default() += 1;
                queue.push_back(parent);
            }
        }
        counts
    }

    /// Apply all grafts and rebuild an unpruned commit map
    pub fn commit_map(&self) -> Result<CommitMap> {
        let tuples: Vec<EdgeTuple> = self.commits.values().map(|c| self.ids(c)).collect();
        build_commit_map(&tuples).map_err(|err| match err {
            GraphError::MissingCommits { ids } => GraphError::Invariant(format!(
                "grafted graph lost {} commit(s), first {}",
                ids.len(),
                ids.first().map(|id| id.to_string()).unwrap_or_default()
            )),
            other => other,
        })
    }

    /// Remove unnecessary commits inside chains
    ///
    /// A chain is a run of single-parent commits between two boundaries.
    /// Boundaries are whitelisted commits, merges, roots and branch points
    /// (commits that more than one live commit descends from directly).
    /// Each commit is checked at most once, so each chain head yields at
    /// most one graft. Returns the number of grafts added or changed.
    pub fn graft_chains(&mut self) -> usize {
        let children = self.live_children();
        // branch points stop chains so split heads keep their shared fork commit
        let is_boundary = |this: &Self, id: CommitId| {
            this.whitelist.contains(&id)
                || this.merge_parent(id).is_some()
                || children.get(&id).copied().unwrap_or_default() > 1
        };

        let mut check: VecDeque<CommitId> = self.seeds.iter().copied().collect();
        let mut checked = HashSet::new();
        let mut heads = VecDeque::new();
        let mut added = 0;

        while !check.is_empty() {
            while let Some(id) = check.pop_front() {
                if !checked.insert(id) {
                    continue;
                }
                let Some(parent) = self.parent(id) else {
                    continue;
                };
                match self.merge_parent(id) {
                    // single parent, may be head of chain
                    None => heads.push_back(id),
                    // merge commit, check both parents for possible chains
                    Some(merge_parent) => {
                        check.push_back(parent);
                        check.push_back(merge_parent);
                    }
                }
            }

            while let Some(head) = heads.pop_front() {
                let Some(head_parent) = self.parent(head) else {
                    continue;
                };

                let mut root = head_parent;
                loop {
                    if is_boundary(&*self, root) {
                        check.extend(self.parents(root));
                        break;
                    }
                    match self.parent(root) {
                        Some(parent) => root = parent,
                        None => break,
                    }
                }

                if root != head_parent && self.add_graft(Graft::new(head, &[root])) {
                    added += 1;
                }
            }
        }

        debug!(added, total = self.grafts.len(), "chain pass");
        added
    }

    /// Nearest merge at or before `start` along first parents
    ///
    /// Stops at a root commit when no merge is found. The flag reports a
    /// whitelisted commit among those visited before the stopping commit.
    fn preceding_merge(&self, start: CommitId) -> (CommitId, bool) {
        let mut commit = start;
        let mut whitelisted = false;
        loop {
            if self.merge_parent(commit).is_some() {
                return (commit, whitelisted);
            }
            match self.parent(commit) {
                Some(parent) => {
                    whitelisted |= self.whitelist.contains(&commit);
                    commit = parent;
                }
                None => return (commit, whitelisted),
            }
        }
    }

    /// Collapse merges whose two legs lead back to the same earlier merge
    ///
    /// When neither leg holds a whitelisted commit the merge is grafted
    /// onto the shared ancestor. When exactly one does, the merge keeps
    /// only that leg. Returns the number of grafts added or changed.
    pub fn graft_loops(&mut self) -> usize {
        let mut merges = VecDeque::new();
        let mut seen = HashSet::new();
        let mut added = 0;

        // enqueue nearest merge commits to whitelist
        for id in &self.seeds {
            let (merge, _) = self.preceding_merge(*id);
            if seen.insert(merge) {
                merges.push_back(merge);
            }
        }

        while let Some(merge) = merges.pop_front() {
            let (Some(parent), Some(merge_parent)) = (self.parent(merge), self.merge_parent(merge)) else {
                continue;
            };

            let (parent_merge, parent_whitelisted) = self.preceding_merge(parent);
            if seen.insert(parent_merge) {
                merges.push_back(parent_merge);
            }

            let (merge_parent_merge, merge_parent_whitelisted) = self.preceding_merge(merge_parent);
            if merge_parent_merge != parent_merge {
                if seen.insert(merge_parent_merge) {
                    merges.push_back(merge_parent_merge);
                }
                continue;
            }

            let target = match (parent_whitelisted, merge_parent_whitelisted) {
                (false, false) => parent_merge,
                (true, false) => parent,
                (false, true) => merge_parent,
                (true, true) => continue,
            };
            if self.add_graft(Graft::new(merge, &[target])) {
                added += 1;
            }
        }

        debug!(added, total = self.grafts.len(), "loop pass");
        added
    }
}
