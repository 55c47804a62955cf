use crate::core::{Commit, CommitId, Repository};
use crate::error::Result;
use std::collections::{HashSet, VecDeque};
use std::io::Write;

/// Graphviz renderer for commit graphs
///
/// Each first-parent run becomes one `node [group=N]` chain, drawn left to
/// right from oldest to newest. Commits carrying refs get a label node.
#[derive(Debug, Clone, Default)]
pub struct DotRenderer;

impl DotRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Write the whole digraph for `repo` to `out`
    pub fn render<W: Write + ?Sized>(&self, repo: &Repository, out: &mut W) -> Result<()> {
        writeln!(out, "digraph {{")?;
        writeln!(out, "rankdir=LR")?;
        writeln!(out, "node [width=0.1, height=0.1, shape=point, fontsize=10]")?;
        writeln!(out, "edge [arrowhead=none]")?;

        self.write_chains(repo, out)?;
        self.write_labels(repo, out)?;

        writeln!(out, "}}")?;
        Ok(())
    }

    /// Render into a string
    pub fn render_to_string(&self, repo: &Repository) -> Result<String> {
        let mut buf = Vec::new();
        self.render(repo, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_chains<W: Write + ?Sized>(&self, repo: &Repository, out: &mut W) -> Result<()> {
        let mut queue: VecDeque<(Commit, Commit)> = VecDeque::new();
        for id in unique_in_order(repo.unmerged_refs().map(|r| r.commit)) {
            if let Some(tip) = repo.commit(id) {
                queue.extend(edges_into(repo, tip));
            }
        }

        let mut processed: HashSet<CommitId> = HashSet::new();
        let mut group = 0;
        while let Some((parent, child)) = queue.pop_front() {
            group += 1;
            writeln!(out, "node [group={}]", group)?;

            let mut chain = vec![child, parent];
            if let Some(merge_parent) = parent.merge_parent.and_then(|id| repo.commit(id)) {
                queue.push_back((*merge_parent, parent));
            }

            // follow first parents until the run joins one already drawn
            let mut commit = parent;
            while !processed.contains(&commit.id) {
                let Some(next) = commit.parent.and_then(|id| repo.commit(id)) else {
                    break;
                };
                commit = *next;
                chain.push(commit);
                if processed.contains(&commit.id) {
                    break;
                }
                if let Some(merge_parent) = commit.merge_parent.and_then(|id| repo.commit(id)) {
                    queue.push_back((*merge_parent, commit));
                }
            }

            let names: Vec<String> = chain.iter().rev().map(|c| quoted(repo, c)).collect();
            writeln!(out, "{}", names.join(" -> "))?;

            processed.extend(chain.iter().map(|c| c.id));
        }

        Ok(())
    }

    fn write_labels<W: Write + ?Sized>(&self, repo: &Repository, out: &mut W) -> Result<()> {
        for id in unique_in_order(repo.refs().commits()) {
            let Some(commit) = repo.commit(id) else {
                continue;
            };
            let names: Vec<String> = repo.refs().at(id).map(|r| r.to_string()).collect();
            writeln!(out, "{} [shape=none, label=\"{}\"]", quoted(repo, commit), names.join("\\n"))?;
        }

        Ok(())
    }
}

/// First occurrence of each id, keeping input order
fn unique_in_order(ids: impl Iterator<Item = CommitId>) -> Vec<CommitId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn edges_into(repo: &Repository, child: &Commit) -> Vec<(Commit, Commit)> {
    child
        .parents()
        .filter_map(|id| repo.commit(id))
        .map(|parent| (*parent, *child))
        .collect()
}

fn quoted(repo: &Repository, commit: &Commit) -> String {
    format!("\"{}\"", repo.abbreviate(commit))
}
