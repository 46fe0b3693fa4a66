//! Grouping of statement records by owning package and hierarchical rollup.
//!
//! Packages form a prefix tree on `/`-separated path segments. Aggregation
//! builds that tree explicitly: every observed package becomes a node,
//! missing ancestors are synthesized as empty nodes, and descendant sums
//! propagate bottom-up in one post-order traversal.

use crate::profile::{package_of, RecordSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Owning package of a statement record: the directory portion of its file
/// path, e.g. `github.com/acme/svc/handlers`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PackageKey(String);

impl PackageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key owning a source file.
    pub fn of_file(file: &str) -> Self {
        Self(package_of(file))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The immediate ancestor, or `None` for a single-segment key.
    pub fn parent(&self) -> Option<PackageKey> {
        self.0.rsplit_once('/').map(|(prefix, _)| Self(prefix.to_string()))
    }
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-package statistics: direct (`self_*`) and rolled up from strict
/// descendants (`child_*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageNode {
    pub self_statements: u64,
    pub self_covered: u64,
    pub child_statements: u64,
    pub child_covered: u64,
}

impl CoverageNode {
    /// Effective statement total: self plus every strict descendant.
    pub fn total_statements(&self) -> u64 {
        self.self_statements + self.child_statements
    }

    pub fn total_covered(&self) -> u64 {
        self.self_covered + self.child_covered
    }
}

/// One node per distinct package, sorted by key. Built once per invocation
/// and immutable afterwards.
#[derive(Debug, Default)]
pub struct CoverageReport {
    nodes: BTreeMap<PackageKey, CoverageNode>,
}

impl CoverageReport {
    pub fn get(&self, key: &str) -> Option<&CoverageNode> {
        self.nodes.get(&PackageKey::new(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackageKey, &CoverageNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Group records by package and compute the hierarchical rollup.
pub fn aggregate(records: &RecordSet) -> CoverageReport {
    let mut nodes: BTreeMap<PackageKey, CoverageNode> = BTreeMap::new();

    // Pass 1: self statistics.
    for record in records.values() {
        let node = nodes.entry(PackageKey::of_file(&record.key.file)).or_default();
        node.self_statements += record.statements;
        if record.is_covered() {
            node.self_covered += record.statements;
        }
    }

    synthesize_ancestors(&mut nodes);

    // Pass 2: bottom-up rollup over the explicit tree.
    let children = child_index(&nodes);
    let roots: Vec<PackageKey> = nodes
        .keys()
        .filter(|key| key.parent().map_or(true, |p| !nodes.contains_key(&p)))
        .cloned()
        .collect();
    for root in roots {
        roll_up(&mut nodes, &children, &root);
    }

    CoverageReport { nodes }
}

/// Ancestors of a reporting package must appear in the report even when
/// they own no direct source.
fn synthesize_ancestors(nodes: &mut BTreeMap<PackageKey, CoverageNode>) {
    let keys: Vec<PackageKey> = nodes.keys().cloned().collect();
    for key in keys {
        let mut cursor = key.parent();
        while let Some(ancestor) = cursor {
            cursor = ancestor.parent();
            nodes.entry(ancestor).or_default();
        }
    }
}

fn child_index(
    nodes: &BTreeMap<PackageKey, CoverageNode>,
) -> BTreeMap<PackageKey, Vec<PackageKey>> {
    let mut children: BTreeMap<PackageKey, Vec<PackageKey>> = BTreeMap::new();
    for key in nodes.keys() {
        if let Some(parent) = key.parent() {
            if nodes.contains_key(&parent) {
                children.entry(parent).or_default().push(key.clone());
            }
        }
    }
    children
}

/// Post-order traversal returning the subtree's (statements, covered),
/// recording each node's descendant sums on the way back up.
fn roll_up(
    nodes: &mut BTreeMap<PackageKey, CoverageNode>,
    children: &BTreeMap<PackageKey, Vec<PackageKey>>,
    key: &PackageKey,
) -> (u64, u64) {
    let mut child_statements = 0;
    let mut child_covered = 0;
    if let Some(kids) = children.get(key) {
        for kid in kids {
            let (statements, covered) = roll_up(nodes, children, kid);
            child_statements += statements;
            child_covered += covered;
        }
    }

    let node = nodes.get_mut(key).expect("node exists for observed key");
    node.child_statements = child_statements;
    node.child_covered = child_covered;
    (
        node.self_statements + child_statements,
        node.self_covered + child_covered,
    )
}
