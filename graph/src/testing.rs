//! Fixtures shared by the unit tests

use crate::core::{Commit, CommitId, CommitMap, Ref, RefCollection, Repository};
use crate::input::MemoryLines;

/// Seven commits, one merge, two branches and two tags:
///
/// ```text
/// 1 - 2 - 4 - 5 - 7   master
///      \     /
///       3 --+- 6      other-branch
/// ```
pub fn mock_lines() -> MemoryLines {
    MemoryLines::new(
        "
7 5
6 3
5 4 3
4 2
3 2
2 1
1
",
        "
7 master
6 other-branch
",
        "
5 merged
1 initial
",
    )
}

/// Builds repositories commit by commit, parents first
pub struct RepoBuilder {
    commits: CommitMap,
    refs: Vec<Ref>,
    next_id: u64,
}

impl RepoBuilder {
    pub fn new() -> Self {
        Self {
            commits: CommitMap::new(),
            refs: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a commit with the next sequential id
    pub fn add(&mut self, parent: Option<CommitId>, merge_parent: Option<CommitId>) -> CommitId {
        let id = CommitId::from_u64(self.next_id);
        self.next_id += 1;
        self.commits.insert(id, Commit::new(id, parent, merge_parent));
        id
    }

    /// Add a commit with an explicit hex id
    pub fn add_hex(&mut self, hex: &str, parent: Option<CommitId>, merge_parent: Option<CommitId>) -> CommitId {
        let id = CommitId::from_hex(hex).expect("valid hex id");
        self.commits.insert(id, Commit::new(id, parent, merge_parent));
        id
    }

    pub fn branch(&mut self, name: &str, commit: CommitId) {
        self.refs.push(Ref::branch(name, commit));
    }

    pub fn tag(&mut self, name: &str, commit: CommitId) {
        self.refs.push(Ref::tag(name, commit));
    }

    pub fn build(self) -> Repository {
        Repository::new(self.commits, RefCollection::new(self.refs)).expect("consistent fixture")
    }
}
