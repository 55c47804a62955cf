use super::id::CommitId;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Edge tuple: the commit id followed by up to two parent ids
pub type EdgeTuple = SmallVec<[CommitId; 3]>;

/// A commit node in the DAG
///
/// Parents are referenced by id; the owning commit map resolves them.
/// Equality and hashing only look at `id`, so a commit rebuilt after
/// grafting still compares equal to the original.
#[derive(Clone, Copy)]
pub struct Commit {
    /// Unique commit ID (SHA)
    pub id: CommitId,
    /// First parent, `None` for a root commit
    pub parent: Option<CommitId>,
    /// Second parent, only set on merge commits
    pub merge_parent: Option<CommitId>,
}

impl Commit {
    pub fn new(id: CommitId, parent: Option<CommitId>, merge_parent: Option<CommitId>) -> Self {
        Self {
            id,
            parent,
            merge_parent,
        }
    }

    pub fn root(id: CommitId) -> Self {
        Self::new(id, None, None)
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Check if this is a merge commit (two parents)
    pub fn is_merge(&self) -> bool {
        self.merge_parent.is_some()
    }

    /// Parent ids in order: first parent, then merge parent
    pub fn parents(&self) -> impl Iterator<Item = CommitId> {
        self.parent.into_iter().chain(self.merge_parent)
    }

    /// This commit as an edge tuple, `[id, parents...]`
    pub fn ids(&self) -> EdgeTuple {
        let mut ids = EdgeTuple::new();
        ids.push(self.id);
        ids.extend(self.parents());
        ids
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &format_args!("{}", self.id))
            .field("parent", &self.parent.map(|p| p.to_string()))
            .field("merge_parent", &self.merge_parent.map(|p| p.to_string()))
            .finish()
    }
}
