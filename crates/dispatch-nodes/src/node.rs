//! `Node` (`§3`): an external worker node, ordered by numeric suffix.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static NUMERIC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)(\d+)$").unwrap());

/// A worker node. `numeric_suffix` is populated when the name matches
/// `node<digits>` (or, more generally, any `<prefix><digits>` form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub numeric_suffix: Option<u64>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let numeric_suffix = NUMERIC_SUFFIX
            .captures(&name)
            .and_then(|c| c.get(2))
            .and_then(|m| m.as_str().parse::<u64>().ok());
        Self {
            name,
            numeric_suffix,
        }
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_suffix, other.numeric_suffix) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.name.cmp(&other.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
        }
    }
}

/// Sort nodes by numeric suffix ascending, then lexicographically; names
/// without a numeric suffix sort after all numeric ones.
pub fn sort_nodes(nodes: &mut [Node]) {
    nodes.sort();
}
