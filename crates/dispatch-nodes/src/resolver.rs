//! `NodePoolResolver` (`§4.4`): computes the available-node set from the
//! defined pool, the live inventory, reservations, and exclusions.

use crate::live::LiveNodeInventory;
use crate::node::{sort_nodes, Node};
use crate::range::parse_node_spec;
use dispatch_utils::error::PlannerError;
use std::collections::HashSet;

/// Resolves the available node pool per the `§4.4` resolution table.
pub struct NodePoolResolver<'a> {
    live: Option<&'a dyn LiveNodeInventory>,
}

impl<'a> NodePoolResolver<'a> {
    #[must_use]
    pub fn new(live: Option<&'a dyn LiveNodeInventory>) -> Self {
        Self { live }
    }

    pub async fn resolve(
        &self,
        defined_spec: Option<&str>,
        use_live: bool,
        reserved: &[String],
        exclude_extra: &[String],
    ) -> Result<Vec<Node>, PlannerError> {
        let defined = defined_spec
            .map(parse_node_spec)
            .filter(|v| !v.is_empty());

        let base: Vec<String> = match (&defined, use_live) {
            (None, false) => return Err(PlannerError::NoSource),
            (None, true) => self.fetch_live().await?,
            (Some(defined), false) => defined.clone(),
            (Some(defined), true) => {
                let live: HashSet<String> = self.fetch_live().await?.into_iter().collect();
                let intersection: Vec<String> =
                    defined.iter().filter(|n| live.contains(*n)).cloned().collect();
                if intersection.is_empty() {
                    return Err(PlannerError::EmptyIntersection);
                }
                intersection
            }
        };

        let reserved: HashSet<&str> = reserved.iter().map(String::as_str).collect();
        let excluded: HashSet<&str> = exclude_extra.iter().map(String::as_str).collect();

        let mut available: Vec<Node> = base
            .into_iter()
            .filter(|n| !reserved.contains(n.as_str()) && !excluded.contains(n.as_str()))
            .map(Node::new)
            .collect();

        if available.is_empty() {
            return Err(PlannerError::NoNodes);
        }

        sort_nodes(&mut available);
        Ok(available)
    }

    async fn fetch_live(&self) -> Result<Vec<String>, PlannerError> {
        match self.live {
            Some(live) => live.fetch_idle().await,
            None => Err(PlannerError::SourceUnavailable {
                source_name: "live-inventory".to_string(),
                reason: "--use-jenkins-nodes set but no live inventory configured".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticLive(Vec<String>);

    #[async_trait]
    impl LiveNodeInventory for StaticLive {
        async fn fetch_idle(&self) -> Result<Vec<String>, PlannerError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn no_source_fails_when_neither_configured() {
        let resolver = NodePoolResolver::new(None);
        let err = resolver.resolve(None, false, &[], &[]).await.unwrap_err();
        assert!(matches!(err, PlannerError::NoSource));
    }

    #[tokio::test]
    async fn live_only_uses_live_idle_set() {
        let live = StaticLive(vec!["node2".to_string(), "node1".to_string()]);
        let resolver = NodePoolResolver::new(Some(&live));
        let nodes = resolver.resolve(None, true, &[], &[]).await.unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["node1", "node2"]);
    }

    #[tokio::test]
    async fn defined_only_uses_defined_set() {
        let resolver = NodePoolResolver::new(None);
        let nodes = resolver
            .resolve(Some("node3,node1"), false, &[], &[])
            .await
            .unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["node1", "node3"]);
    }

    #[tokio::test]
    async fn defined_and_live_intersect() {
        let live = StaticLive(vec!["node1".to_string(), "node2".to_string()]);
        let resolver = NodePoolResolver::new(Some(&live));
        let nodes = resolver
            .resolve(Some("node2,node3"), true, &[], &[])
            .await
            .unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["node2"]);
    }

    #[tokio::test]
    async fn empty_intersection_fails() {
        let live = StaticLive(vec!["node9".to_string()]);
        let resolver = NodePoolResolver::new(Some(&live));
        let err = resolver
            .resolve(Some("node1,node2"), true, &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::EmptyIntersection));
    }

    #[tokio::test]
    async fn reserved_and_excluded_are_removed() {
        let resolver = NodePoolResolver::new(None);
        let nodes = resolver
            .resolve(
                Some("node1,node2,node3"),
                false,
                &["node2".to_string()],
                &["node3".to_string()],
            )
            .await
            .unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["node1"]);
    }

    #[tokio::test]
    async fn no_nodes_after_exclusion_fails() {
        let resolver = NodePoolResolver::new(None);
        let err = resolver
            .resolve(Some("node1"), false, &["node1".to_string()], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::NoNodes));
    }
}
