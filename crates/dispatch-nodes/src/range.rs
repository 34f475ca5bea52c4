//! Node pool spec range expansion (`§4.4`): `<prefix><m>-<prefix><n>`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static RANGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_-]*)(\d+)-([A-Za-z_-]*)(\d+)$").unwrap());

/// Parse a comma-separated node pool spec, expanding any
/// `<prefix><m>-<prefix><n>` token into the inclusive list of names.
/// Single tokens pass through unchanged; a token shaped like a range but
/// with mismatched prefixes or `m > n` is kept as a literal with a warning.
#[must_use]
pub fn parse_node_spec(spec: &str) -> Vec<String> {
    let mut out = Vec::new();
    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.contains('-') {
            if let Some(expanded) = try_expand_range(token) {
                out.extend(expanded);
                continue;
            }
            warn!(token, "unrecognized node range form, treating as literal");
        }
        out.push(token.to_string());
    }
    out
}

fn try_expand_range(token: &str) -> Option<Vec<String>> {
    let caps = RANGE_TOKEN.captures(token)?;
    let prefix_a = &caps[1];
    let m: u64 = caps[2].parse().ok()?;
    let prefix_b = &caps[3];
    let n: u64 = caps[4].parse().ok()?;
    if prefix_a != prefix_b || m > n {
        return None;
    }
    Some((m..=n).map(|i| format!("{prefix_a}{i}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_simple_range() {
        let nodes = parse_node_spec("node2,node10-node12,node5");
        assert_eq!(nodes, vec!["node2", "node10", "node11", "node12", "node5"]);
    }

    #[test]
    fn single_tokens_pass_through() {
        let nodes = parse_node_spec("node1, node2 , node3");
        assert_eq!(nodes, vec!["node1", "node2", "node3"]);
    }

    #[test]
    fn mismatched_prefix_is_literal() {
        let nodes = parse_node_spec("node1-agent5");
        assert_eq!(nodes, vec!["node1-agent5"]);
    }

    #[test]
    fn reversed_range_is_literal() {
        let nodes = parse_node_spec("node12-node10");
        assert_eq!(nodes, vec!["node12-node10"]);
    }

    #[test]
    fn empty_tokens_are_skipped() {
        let nodes = parse_node_spec("node1,,node2,");
        assert_eq!(nodes, vec!["node1", "node2"]);
    }
}
