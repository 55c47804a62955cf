use crate::core::{CommitId, EdgeTuple};

/// A pending rewrite of one commit's parents
///
/// Keyed by the commit's own id, which never changes; the replacement
/// parents are the remaining entries of the tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graft {
    ids: EdgeTuple,
}

impl Graft {
    pub fn new(id: CommitId, parents: &[CommitId]) -> Self {
        let mut ids = EdgeTuple::new();
        ids.push(id);
        ids.extend(parents.iter().copied().take(2));
        Self { ids }
    }

    pub fn id(&self) -> CommitId {
        self.ids[0]
    }

    pub fn parent(&self) -> Option<CommitId> {
        self.ids.get(1).copied()
    }

    pub fn merge_parent(&self) -> Option<CommitId> {
        self.ids.get(2).copied()
    }

    pub fn parents(&self) -> &[CommitId] {
        &self.ids[1..]
    }

    /// The replacement edge tuple fed back into the graph builder
    pub fn ids(&self) -> &EdgeTuple {
        &self.ids
    }
}
