use crate::config::SourceConfig;
use crate::core::CommitId;
use crate::error::Result;
use crate::input::LineSource;
use git2::{BranchType, Oid, Repository, Sort};
use std::collections::HashSet;
use tracing::debug;

/// Line source reading commits and refs straight from a git repository
pub struct GitWalker {
    repo: Repository,
    source: SourceConfig,
}

impl GitWalker {
    pub fn new(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }?;

        Ok(Self {
            repo,
            source: SourceConfig::default(),
        })
    }

    /// Choose which branches and tags are listed
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    /// Branch names and the commits they point at
    fn branch_refs(&self) -> Result<Vec<(String, Oid)>> {
        let mut refs = Vec::new();
        let (kind, prefix) = if self.source.local_branches {
            (BranchType::Local, String::new())
        } else {
            (BranchType::Remote, format!("{}/", self.source.remote))
        };

        for branch in self.repo.branches(Some(kind))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            let Some(short) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if short == "HEAD" {
                continue;
            }
            let target = branch.get().peel_to_commit()?.id();
            refs.push((short.to_string(), target));
        }

        Ok(refs)
    }

    /// Tag names and the commits they point at, peeling annotated tags
    fn tag_refs(&self) -> Result<Vec<(String, Oid)>> {
        let mut refs = Vec::new();
        if !self.source.include_tags {
            return Ok(refs);
        }

        for name in self.repo.tag_names(None)?.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            match reference.peel_to_commit() {
                Ok(commit) => refs.push((name.to_string(), commit.id())),
                Err(err) => debug!(tag = name, %err, "skipping tag that is not a commit"),
            }
        }

        Ok(refs)
    }
}

fn ref_lines(refs: Vec<(String, Oid)>) -> Vec<String> {
    refs.into_iter()
        .map(|(name, oid)| format!("{} {}", CommitId::from(oid), name))
        .collect()
}

impl LineSource for GitWalker {
    /// One line per commit reachable from any listed ref
    fn commit_lines(&self) -> Result<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;

        let mut pushed = HashSet::new();
        for (_, target) in self.branch_refs()?.into_iter().chain(self.tag_refs()?) {
            if pushed.insert(target) {
                revwalk.push(target)?;
            }
        }

        let mut lines = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let mut line = CommitId::from(commit.id()).to_string();
            for parent in commit.parent_ids() {
                line.push(' ');
                line.push_str(&CommitId::from(parent).to_string());
            }
            lines.push(line);
        }

        debug!(commits = lines.len(), "walked repository");
        Ok(lines)
    }

    fn branch_lines(&self) -> Result<Vec<String>> {
        Ok(ref_lines(self.branch_refs()?))
    }

    fn tag_lines(&self) -> Result<Vec<String>> {
        Ok(ref_lines(self.tag_refs()?))
    }
}
