use super::commit::{Commit, EdgeTuple};
use super::id::CommitId;
use super::lookup::MultiMap;
use crate::error::{GraphError, Result};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Commits of one graph snapshot, indexed by id
pub type CommitMap = HashMap<CommitId, Commit>;

/// Turn edge tuples into a commit map whose parent links all resolve
///
/// Tuples may appear in any order. Roots are materialised first, then
/// children are built as soon as every parent they name exists; a child
/// whose merge parent is not ready yet goes back on the queue. Ids beyond
/// the second parent are ignored.
pub fn build_commit_map(tuples: &[EdgeTuple]) -> Result<CommitMap> {
    let child_lookup: MultiMap<CommitId, usize> = tuples
        .iter()
        .enumerate()
        .flat_map(|(ix, ids)| ids.iter().skip(1).take(2).map(move |parent| (*parent, ix)))
        .collect();

    let mut commits = CommitMap::with_capacity(tuples.len());
    let mut pending = VecDeque::new();

    for (ix, ids) in tuples.iter().enumerate() {
        if ids.len() == 1 {
            materialise(Commit::root(ids[0]), ix, &mut commits, &mut pending, &child_lookup);
        }
    }

    // consecutive requeues since the last commit was materialised
    let mut stalled = 0;
    while let Some(ix) = pending.pop_front() {
        let ids = &tuples[ix];
        if commits.contains_key(&ids[0]) {
            stalled = 0;
            continue;
        }

        let parent = commits.get(&ids[1]).map(|c| c.id);
        let merge_parent = match ids.get(2) {
            Some(id) => commits.get(id).map(|c| Some(c.id)),
            None => Some(None),
        };

        match (parent, merge_parent) {
            (Some(parent), Some(merge_parent)) => {
                stalled = 0;
                let commit = Commit::new(ids[0], Some(parent), merge_parent);
                materialise(commit, ix, &mut commits, &mut pending, &child_lookup);
            }
            _ => {
                pending.push_back(ix);
                stalled += 1;
                if stalled >= pending.len() {
                    break;
                }
            }
        }
    }

    let defined: HashSet<CommitId> = tuples.iter().filter_map(|ids| ids.first().copied()).collect();
    if commits.len() < defined.len() {
        return Err(GraphError::MissingCommits {
            ids: unresolved_ids(tuples, &commits, &defined),
        });
    }

    debug!(commits = commits.len(), "built commit map");
    Ok(commits)
}

fn materialise(
    commit: Commit,
    ix: usize,
    commits: &mut CommitMap,
    pending: &mut VecDeque<usize>,
    child_lookup: &MultiMap<CommitId, usize>,
) {
    if commits.contains_key(&commit.id) {
        return;
    }
    commits.insert(commit.id, commit);
    pending.extend(
        child_lookup
            .get(&commit.id)
            .iter()
            .copied()
            .filter(|child| *child != ix),
    );
}

/// Parent ids that kept unbuilt tuples from resolving
///
/// Prefers ids that no tuple defines at all; when every id is defined
/// (a cycle in the input) the unbuilt parents themselves are reported.
fn unresolved_ids(tuples: &[EdgeTuple], commits: &CommitMap, defined: &HashSet<CommitId>) -> Vec<CommitId> {
    let blocked: Vec<CommitId> = tuples
        .iter()
        .filter(|ids| ids.first().is_some_and(|id| !commits.contains_key(id)))
        .flat_map(|ids| ids.iter().skip(1).take(2).copied())
        .filter(|parent| !commits.contains_key(parent))
        .collect();

    let undefined: BTreeSet<CommitId> = blocked
        .iter()
        .copied()
        .filter(|id| !defined.contains(id))
        .collect();

    if undefined.is_empty() {
        blocked.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
    } else {
        undefined.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn id(n: u64) -> CommitId {
        CommitId::from_u64(n)
    }

    fn tuple(ids: &[u64]) -> EdgeTuple {
        ids.iter().map(|n| id(*n)).collect()
    }

    #[test]
    fn test_children_listed_before_parents() {
        let tuples = vec![
            tuple(&[7, 5]),
            tuple(&[6, 3]),
            tuple(&[5, 4, 3]),
            tuple(&[4, 2]),
            tuple(&[3, 2]),
            tuple(&[2, 1]),
            tuple(&[1]),
        ];
        let commits = build_commit_map(&tuples).unwrap();

        assert_eq!(commits.len(), 7);
        assert!(commits[&id(1)].is_root());
        assert_eq!(commits[&id(5)].parent, Some(id(4)));
        assert_eq!(commits[&id(5)].merge_parent, Some(id(3)));
        assert_eq!(commits[&id(7)].parent, Some(id(5)));
    }

    #[test]
    fn test_merge_waits_for_both_parents() {
        // the merge is reachable from 2 long before 9 exists
        let tuples = vec![
            tuple(&[1]),
            tuple(&[2, 1]),
            tuple(&[3, 2, 9]),
            tuple(&[9, 8]),
            tuple(&[8, 1]),
        ];
        let commits = build_commit_map(&tuples).unwrap();
        assert_eq!(commits.len(), 5);
        assert_eq!(commits[&id(3)].merge_parent, Some(id(9)));
    }

    #[test]
    fn test_octopus_parents_are_dropped() {
        let octopus: EdgeTuple = smallvec![id(4), id(1), id(2), id(3)];
        let tuples = vec![tuple(&[1]), tuple(&[2]), tuple(&[3]), octopus];
        let commits = build_commit_map(&tuples).unwrap();
        assert_eq!(commits[&id(4)].parents().collect::<Vec<_>>(), vec![id(1), id(2)]);
    }

    #[test]
    fn test_duplicate_tuples_keep_first() {
        let tuples = vec![tuple(&[1]), tuple(&[2, 1]), tuple(&[2, 1])];
        let commits = build_commit_map(&tuples).unwrap();
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_commit_map(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let tuples = vec![tuple(&[1]), tuple(&[2, 1]), tuple(&[3, 2, 42]), tuple(&[4, 3])];
        match build_commit_map(&tuples) {
            Err(GraphError::MissingCommits { ids }) => assert_eq!(ids, vec![id(42)]),
            other => panic!("expected missing commits, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_first_parent_never_enqueued() {
        let tuples = vec![tuple(&[1]), tuple(&[5, 99])];
        match build_commit_map(&tuples) {
            Err(GraphError::MissingCommits { ids }) => assert_eq!(ids, vec![id(99)]),
            other => panic!("expected missing commits, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_without_roots_fails() {
        let tuples = vec![tuple(&[1, 2]), tuple(&[2, 1])];
        match build_commit_map(&tuples) {
            Err(GraphError::MissingCommits { ids }) => assert_eq!(ids, vec![id(1), id(2)]),
            other => panic!("expected missing commits, got {:?}", other),
        }
    }
}
