pub mod filter;
pub mod walker;

pub use walker::{find_profile_files, find_source_directories, TreeWalker, WalkMode};
