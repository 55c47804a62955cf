use super::id::CommitId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Branch,
    Tag,
}

/// A named pointer onto a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub name: String,
    pub kind: RefKind,
    pub commit: CommitId,
}

impl Ref {
    pub fn new(name: impl Into<String>, kind: RefKind, commit: CommitId) -> Self {
        Self {
            name: name.into(),
            kind,
            commit,
        }
    }

    pub fn branch(name: impl Into<String>, commit: CommitId) -> Self {
        Self::new(name, RefKind::Branch, commit)
    }

    pub fn tag(name: impl Into<String>, commit: CommitId) -> Self {
        Self::new(name, RefKind::Tag, commit)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RefKind::Branch => write!(f, "{}", self.name),
            RefKind::Tag => write!(f, "<{}>", self.name),
        }
    }
}

/// The refs of one repository snapshot, in input order
#[derive(Debug, Clone, Default)]
pub struct RefCollection {
    refs: Vec<Ref>,
}

impl RefCollection {
    pub fn new(refs: Vec<Ref>) -> Self {
        Self { refs }
    }

    pub fn all(&self) -> &[Ref] {
        &self.refs
    }

    pub fn branches(&self) -> impl Iterator<Item = &Ref> {
        self.refs.iter().filter(|r| r.kind == RefKind::Branch)
    }

    pub fn tags(&self) -> impl Iterator<Item = &Ref> {
        self.refs.iter().filter(|r| r.kind == RefKind::Tag)
    }

    pub fn by_name(&self, name: &str) -> Option<&Ref> {
        self.refs.iter().find(|r| r.name == name)
    }

    /// Ids of every referenced commit (the whitelist)
    pub fn commits(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.refs.iter().map(|r| r.commit)
    }

    /// Refs pointing at `id`
    pub fn at(&self, id: CommitId) -> impl Iterator<Item = &Ref> {
        self.refs.iter().filter(move |r| r.commit == id)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ref> {
        self.refs.iter()
    }
}

impl<'a> IntoIterator for &'a RefCollection {
    type Item = &'a Ref;
    type IntoIter = std::slice::Iter<'a, Ref>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

impl FromIterator<Ref> for RefCollection {
    fn from_iter<I: IntoIterator<Item = Ref>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
