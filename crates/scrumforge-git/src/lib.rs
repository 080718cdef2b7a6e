pub mod worktree;

pub use worktree::{BranchKind, WorktreeManager, WorktreeStatusReport};
