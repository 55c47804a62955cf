//! Shortest-unique-prefix lookup over commit ids
//!
//! The index is a trie keyed by the hex digits of each id. A node that only
//! one id passes through stores that id as a leaf instead of growing a
//! chain of single-child nodes; the leaf is pushed down as soon as a second
//! id shares the node.

use crate::core::id::{hex_value, ID_HEX_LEN};
use crate::core::CommitId;
use crate::error::{GraphError, Result};
use smallvec::SmallVec;

/// Git's default abbreviation length
pub const DEFAULT_MIN_LEN: usize = 7;

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct Node {
    children: SmallVec<[(u8, u32); 4]>,
    /// Number of ids below this node
    count: usize,
    /// Set exactly when `count == 1`
    leaf: Option<CommitId>,
}

impl Node {
    fn child(&self, nibble: u8) -> Option<usize> {
        self.children
            .iter()
            .find(|(n, _)| *n == nibble)
            .map(|(_, ix)| *ix as usize)
    }
}

#[derive(Debug)]
pub struct PrefixIndex {
    nodes: Vec<Node>,
    min_len: usize,
}

impl PrefixIndex {
    pub fn new<I>(ids: I, min_len: usize) -> Self
    where
        I: IntoIterator<Item = CommitId>,
    {
        let mut index = Self {
            nodes: vec![Node::default()],
            min_len: min_len.min(ID_HEX_LEN),
        };
        for id in ids {
            if !index.contains(id) {
                index.insert(id);
            }
        }
        index
    }

    /// Number of distinct ids indexed
    pub fn len(&self) -> usize {
        self.nodes[ROOT].count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: CommitId) -> bool {
        let nibbles: Vec<u8> = id.nibbles().collect();
        matches!(self.lookup(&nibbles), (1, Some(found)) if found == id)
    }

    /// Resolve a hex prefix to the single id it names
    ///
    /// No match is `Ok(None)`; more than one match is an error.
    pub fn find(&self, prefix: &str) -> Result<Option<CommitId>> {
        let nibbles = parse_prefix(prefix)?;
        if nibbles.len() > ID_HEX_LEN {
            return Ok(None);
        }
        match self.lookup(&nibbles) {
            (0, _) => Ok(None),
            (1, leaf) => Ok(leaf),
            (matches, _) => Err(GraphError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                matches,
            }),
        }
    }

    /// Shortest prefix of `id`, at least `min_len` digits, naming only `id`
    ///
    /// Ids that are not in the index get their full hex form.
    pub fn shortest_unique_prefix(&self, id: CommitId) -> String {
        let hex = id.to_string();
        let mut node = &self.nodes[ROOT];
        for (depth, nibble) in id.nibbles().enumerate() {
            if let Some(leaf) = node.leaf {
                if leaf != id {
                    break;
                }
                return hex[..depth.max(self.min_len)].to_string();
            }
            match node.child(nibble) {
                Some(ix) => node = &self.nodes[ix],
                None => break,
            }
        }
        hex
    }

    /// Count of ids under a nibble prefix, plus the id when it is unique
    fn lookup(&self, nibbles: &[u8]) -> (usize, Option<CommitId>) {
        let mut node = &self.nodes[ROOT];
        for (depth, nibble) in nibbles.iter().enumerate() {
            if let Some(leaf) = node.leaf {
                let matches = leaf
                    .nibbles()
                    .skip(depth)
                    .zip(&nibbles[depth..])
                    .all(|(a, b)| a == *b);
                return if matches { (1, Some(leaf)) } else { (0, None) };
            }
            match node.child(*nibble) {
                Some(ix) => node = &self.nodes[ix],
                None => return (0, None),
            }
        }
        (node.count, node.leaf)
    }

    /// Insert an id that is not yet present
    ///
    /// Two distinct ids always part before the last digit, so the final
    /// level only ever receives a single leaf.
    fn insert(&mut self, id: CommitId) {
        let nibbles: Vec<u8> = id.nibbles().collect();
        let mut node = ROOT;
        for depth in 0..=ID_HEX_LEN {
            self.nodes[node].count += 1;
            if self.nodes[node].count == 1 {
                self.nodes[node].leaf = Some(id);
                return;
            }
            if depth == ID_HEX_LEN {
                return;
            }
            if let Some(existing) = self.nodes[node].leaf.take() {
                let nibble = existing.nibbles().nth(depth).unwrap_or_default();
                let child = self.child_or_insert(node, nibble);
                self.nodes[child].count = 1;
                self.nodes[child].leaf = Some(existing);
            }
            node = self.child_or_insert(node, nibbles[depth]);
        }
    }

    fn child_or_insert(&mut self, node: usize, nibble: u8) -> usize {
        if let Some(ix) = self.nodes[node].child(nibble) {
            return ix;
        }
        let ix = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes[node].children.push((nibble, ix as u32));
        ix
    }
}

fn parse_prefix(prefix: &str) -> Result<Vec<u8>> {
    prefix
        .bytes()
        .map(|ch| {
            hex_value(ch).ok_or_else(|| GraphError::InvalidId {
                text: prefix.to_string(),
            })
        })
        .collect()
}
