pub mod walker;

pub use walker::GitWalker;
