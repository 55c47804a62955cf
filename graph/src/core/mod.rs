pub mod id;
pub mod commit;
pub mod lookup;
pub mod builder;
pub mod refs;
pub mod repository;

pub use id::CommitId;
pub use commit::{Commit, EdgeTuple};
pub use lookup::MultiMap;
pub use builder::{build_commit_map, CommitMap};
pub use refs::{Ref, RefCollection, RefKind};
pub use repository::{Repository, RepositoryStats};
