use super::builder::{build_commit_map, CommitMap};
use super::commit::Commit;
use super::id::CommitId;
use super::lookup::MultiMap;
use super::refs::{Ref, RefCollection, RefKind};
use crate::error::{GraphError, Result};
use crate::input::{parse_commit_line, parse_ref_line, LineSource};
use crate::prefix::{PrefixIndex, DEFAULT_MIN_LEN};
use once_cell::unsync::OnceCell;
use std::collections::{BTreeSet, HashSet};
use tracing::info;

/// One snapshot of a commit graph and the refs pointing into it
///
/// Snapshots are never modified after construction. The child lookup and
/// the prefix index are derived on first use and belong to this snapshot
/// only; optimising produces a new repository with fresh indices.
#[derive(Debug)]
pub struct Repository {
    commits: CommitMap,
    refs: RefCollection,
    abbrev_min_len: usize,
    children: OnceCell<MultiMap<CommitId, CommitId>>,
    prefix_index: OnceCell<PrefixIndex>,
}

impl Repository {
    /// Wrap an already-built commit map, checking that every link resolves
    pub fn new(commits: CommitMap, refs: RefCollection) -> Result<Self> {
        let missing: BTreeSet<CommitId> = commits
            .values()
            .flat_map(|c| c.parents())
            .filter(|p| !commits.contains_key(p))
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::MissingCommits {
                ids: missing.into_iter().collect(),
            });
        }

        if let Some(r) = refs.iter().find(|r| !commits.contains_key(&r.commit)) {
            return Err(GraphError::DanglingRef {
                name: r.name.clone(),
                id: r.commit,
            });
        }

        Ok(Self {
            commits,
            refs,
            abbrev_min_len: DEFAULT_MIN_LEN,
            children: OnceCell::new(),
            prefix_index: OnceCell::new(),
        })
    }

    /// Build a repository from raw commit, branch and tag lines
    pub fn build<C, B, T>(commit_lines: C, branch_lines: B, tag_lines: T) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let tuples = commit_lines
            .into_iter()
            .filter(|line| !line.as_ref().trim().is_empty())
            .map(|line| parse_commit_line(line.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let commits = build_commit_map(&tuples)?;

        let mut refs = Vec::new();
        for (lines, kind) in [
            (collect_lines(branch_lines), RefKind::Branch),
            (collect_lines(tag_lines), RefKind::Tag),
        ] {
            for line in lines {
                let (id, name) = parse_ref_line(&line)?;
                refs.push(Ref::new(name, kind, id));
            }
        }

        let repo = Self::new(commits, RefCollection::new(refs))?;
        info!(
            commits = repo.len(),
            refs = repo.refs.len(),
            "built repository"
        );
        Ok(repo)
    }

    /// Build a repository from everything a line source lists
    pub fn import<S: LineSource + ?Sized>(source: &S) -> Result<Self> {
        Self::build(source.commit_lines()?, source.branch_lines()?, source.tag_lines()?)
    }

    /// Use a different minimum abbreviation length
    pub fn with_abbrev_min_len(mut self, min_len: usize) -> Self {
        self.abbrev_min_len = min_len;
        self.prefix_index = OnceCell::new();
        self
    }

    pub fn abbrev_min_len(&self) -> usize {
        self.abbrev_min_len
    }

    pub fn commits(&self) -> &CommitMap {
        &self.commits
    }

    pub fn commit(&self, id: CommitId) -> Option<&Commit> {
        self.commits.get(&id)
    }

    pub fn refs(&self) -> &RefCollection {
        &self.refs
    }

    /// Count of commits
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Ids of every commit a ref points at
    pub fn whitelist(&self) -> HashSet<CommitId> {
        self.refs.commits().collect()
    }

    /// Parent id -> child ids, built once per snapshot
    pub fn child_lookup(&self) -> &MultiMap<CommitId, CommitId> {
        self.children.get_or_init(|| {
            self.commits
                .values()
                .flat_map(|c| c.parents().map(move |p| (p, c.id)))
                .collect()
        })
    }

    /// Get children of a commit
    pub fn children(&self, id: CommitId) -> &[CommitId] {
        self.child_lookup().get(&id)
    }

    /// Refs whose commit has no children in this snapshot
    pub fn unmerged_refs(&self) -> impl Iterator<Item = &Ref> {
        let children = self.child_lookup();
        self.refs.iter().filter(move |r| !children.contains_key(&r.commit))
    }

    pub fn prefix_index(&self) -> &PrefixIndex {
        self.prefix_index
            .get_or_init(|| PrefixIndex::new(self.commits.keys().copied(), self.abbrev_min_len))
    }

    /// Find a commit by full id or unique prefix
    pub fn find_commit(&self, prefix: &str) -> Result<Option<&Commit>> {
        Ok(self
            .prefix_index()
            .find(prefix)?
            .and_then(|id| self.commits.get(&id)))
    }

    /// Shortest unique abbreviation of a commit's id
    pub fn abbreviate(&self, commit: &Commit) -> String {
        self.prefix_index().shortest_unique_prefix(commit.id)
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> RepositoryStats {
        let children = self.child_lookup();
        RepositoryStats {
            total_commits: self.commits.len(),
            merge_commits: self.commits.values().filter(|c| c.is_merge()).count(),
            root_commits: self.commits.values().filter(|c| c.is_root()).count(),
            leaf_commits: self
                .commits
                .keys()
                .filter(|id| !children.contains_key(id))
                .count(),
            branches: self.refs.branches().count(),
            tags: self.refs.tags().count(),
        }
    }
}

fn collect_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub leaf_commits: usize,
    pub branches: usize,
    pub tags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MemoryLines;
    use crate::testing::{mock_lines, RepoBuilder};
    use pretty_assertions::assert_eq;

    fn id(n: u64) -> CommitId {
        CommitId::from_u64(n)
    }

    fn sorted(mut ids: Vec<CommitId>) -> Vec<CommitId> {
        ids.sort();
        ids
    }

    #[test]
    fn test_commit_count() {
        let repo = Repository::import(&mock_lines()).unwrap();
        assert_eq!(repo.len(), 7);
    }

    #[test]
    fn test_child_commits() {
        let repo = Repository::import(&mock_lines()).unwrap();
        assert_eq!(repo.children(id(1)), &[id(2)]);
        assert_eq!(sorted(repo.children(id(3)).to_vec()), vec![id(5), id(6)]);
        assert!(repo.children(id(6)).is_empty());
    }

    #[test]
    fn test_refs() {
        let repo = Repository::import(&mock_lines()).unwrap();
        let refs = repo.refs();
        assert_eq!(refs.by_name("master").map(|r| r.commit), Some(id(7)));
        assert_eq!(refs.by_name("other-branch").map(|r| r.commit), Some(id(6)));
        assert_eq!(refs.by_name("merged").map(|r| r.kind), Some(RefKind::Tag));
        assert_eq!(refs.by_name("initial").map(|r| r.commit), Some(id(1)));
    }

    #[test]
    fn test_commit_depth() {
        let repo = Repository::import(&mock_lines()).unwrap();

        // longest path from the root, counted iteratively
        let mut depth = std::collections::HashMap::new();
        let mut stack = vec![(id(1), 1usize)];
        while let Some((commit, d)) = stack.pop() {
            let best = depth.entry(commit).or_insert(0);
            if d > *best {
                *best = d;
                stack.extend(repo.children(commit).iter().map(|c| (*c, d + 1)));
            }
        }
        assert_eq!(depth.values().max().copied(), Some(5));
    }

    #[test]
    fn test_unmerged() {
        let repo = Repository::import(&mock_lines()).unwrap();
        let mut names: Vec<_> = repo.unmerged_refs().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["master", "other-branch"]);
    }

    #[test]
    fn test_malformed_ref_line() {
        let lines = MemoryLines::new("1", "1master", "");
        match Repository::import(&lines) {
            Err(GraphError::MalformedLine { line }) => assert_eq!(line, "1master"),
            other => panic!("expected malformed line, got {:?}", other),
        }
    }

    #[test]
    fn test_ref_onto_unknown_commit() {
        let lines = MemoryLines::new("1", "2 master", "");
        assert!(matches!(
            Repository::import(&lines),
            Err(GraphError::DanglingRef { .. })
        ));
    }

    #[test]
    fn test_missing_parent() {
        let lines = MemoryLines::new("2 1", "2 master", "");
        match Repository::import(&lines) {
            Err(GraphError::MissingCommits { ids }) => assert_eq!(ids, vec![id(1)]),
            other => panic!("expected missing commits, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_dangling_parent() {
        let mut commits = CommitMap::new();
        commits.insert(id(2), Commit::new(id(2), Some(id(1)), None));
        assert!(matches!(
            Repository::new(commits, RefCollection::default()),
            Err(GraphError::MissingCommits { .. })
        ));
    }

    #[test]
    fn test_find_and_abbreviate() {
        let mut builder = RepoBuilder::new();
        let c1 = builder.add_hex("356a192b7913b04c54574d18c28d46e6395428ab", None, None);
        let c2 = builder.add_hex("356a192bbacccdf19c0760cab7aec4a8359010b0", Some(c1), None);
        let c3 = builder.add_hex("356a192bbac823babbb58edb1c8e14d7106e83bb", Some(c2), None);
        let c4 = builder.add_hex("1b6453892473a467d07372d45eb05abc2031647a", Some(c3), None);
        builder.branch("master", c4);
        let repo = builder.build();

        assert_eq!(repo.abbreviate(&repo.commits()[&c1]), "356a192b7");
        assert_eq!(repo.abbreviate(&repo.commits()[&c4]), "1b64538");
        assert_eq!(repo.find_commit("1b64538").unwrap().map(|c| c.id), Some(c4));
        assert!(repo.find_commit("356a192bb").is_err());
        assert!(repo.find_commit("6395428ab").unwrap().is_none());

        let longer = repo.with_abbrev_min_len(10);
        assert_eq!(longer.abbreviate(&longer.commits()[&c4]), "1b64538924");
    }

    #[test]
    fn test_stats() {
        let repo = Repository::import(&mock_lines()).unwrap();
        assert_eq!(
            repo.stats(),
            RepositoryStats {
                total_commits: 7,
                merge_commits: 1,
                root_commits: 1,
                leaf_commits: 2,
                branches: 2,
                tags: 2,
            }
        );
    }
}
