//! Pure path predicates used by the tree walker.
//!
//! These decide which directories get pruned and which entries get
//! collected. They perform no I/O themselves except the directory probe in
//! [`is_candidate_source_directory`].

use std::path::Path;

/// Extension of coverage profile files.
pub const PROFILE_EXTENSION: &str = "cov";

/// Extension of buildable source files.
pub const SOURCE_EXTENSION: &str = "go";

/// Directory holding test fixtures, never descended into.
const FIXTURE_DIR: &str = "testdata";

/// Directory holding vendored dependencies, never descended into.
const VENDOR_DIR: &str = "vendor";

/// True if the walker must prune this directory entirely: hidden or
/// underscore-prefixed names, test fixtures, and vendored trees.
pub fn should_skip_directory(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == FIXTURE_DIR || name == VENDOR_DIR
}

/// True if `name` is a buildable source file: right extension, not hidden
/// or underscore-prefixed, and not a test file.
pub fn is_buildable_source(name: &str) -> bool {
    if name.starts_with('.') || name.starts_with('_') {
        return false;
    }
    name.strip_suffix(&format!(".{SOURCE_EXTENSION}"))
        .is_some_and(|stem| !stem.ends_with("_test"))
}

/// True if the directory directly contains at least one buildable source
/// file. An unreadable or source-less directory is simply not a candidate,
/// never an error.
pub fn is_candidate_source_directory(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry.file_type().is_ok_and(|ft| ft.is_file())
            && entry
                .file_name()
                .to_str()
                .is_some_and(is_buildable_source)
    })
}

/// True if `name` is a coverage profile file worth collecting.
pub fn is_candidate_profile_file(name: &str) -> bool {
    !name.starts_with('.')
        && !name.starts_with('_')
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == PROFILE_EXTENSION)
}
