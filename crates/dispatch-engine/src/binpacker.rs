//! `BinPacker` (`§4.7`): greedy longest-processing-time-first bin packing.

/// One packed bin: its groups in packing order, and their summed duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bin {
    pub groups: Vec<String>,
    pub total_seconds: u64,
}

/// Packs `group_seconds` into `bin_count` bins by greedy LPT: groups sorted
/// by seconds descending (ties by name ascending), each appended to the
/// currently-smallest bin (ties by lowest index). Empty input or
/// `bin_count == 0` yields an empty list.
#[must_use]
pub fn pack(group_seconds: &std::collections::HashMap<String, u64>, bin_count: usize) -> Vec<Bin> {
    if group_seconds.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let mut items: Vec<(&String, u64)> = group_seconds.iter().map(|(k, &v)| (k, v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|_| Bin {
            groups: Vec::new(),
            total_seconds: 0,
        })
        .collect();

    for (group, seconds) in items {
        let target = bins
            .iter()
            .enumerate()
            .min_by_key(|(idx, bin)| (bin.total_seconds, *idx))
            .map(|(idx, _)| idx)
            .expect("bins is nonempty");
        bins[target].groups.push(group.clone());
        bins[target].total_seconds += seconds;
    }

    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn s1_equal_durations_one_per_bin() {
        let groups = map(&[("g1", 3600), ("g2", 3600), ("g3", 3600), ("g4", 3600)]);
        let bins = pack(&groups, 4);
        assert_eq!(bins.len(), 4);
        for bin in &bins {
            assert_eq!(bin.groups.len(), 1);
        }
        let names: Vec<&str> = bins.iter().map(|b| b.groups[0].as_str()).collect();
        assert_eq!(names, vec!["g1", "g2", "g3", "g4"]);
    }

    #[test]
    fn largest_first_fills_smallest_bin() {
        let groups = map(&[("big", 300), ("med", 200), ("small", 100)]);
        let bins = pack(&groups, 2);
        assert_eq!(bins[0].groups, vec!["big"]);
        assert_eq!(bins[1].groups, vec!["med", "small"]);
        assert_eq!(bins[0].total_seconds, 300);
        assert_eq!(bins[1].total_seconds, 300);
    }

    #[test]
    fn empty_groups_yields_empty_bins() {
        let groups = HashMap::new();
        assert!(pack(&groups, 3).is_empty());
    }

    #[test]
    fn zero_bins_yields_empty() {
        let groups = map(&[("g1", 100)]);
        assert!(pack(&groups, 0).is_empty());
    }

    #[test]
    fn ties_in_duration_break_by_name() {
        let groups = map(&[("b", 100), ("a", 100)]);
        let bins = pack(&groups, 2);
        assert_eq!(bins[0].groups, vec!["a"]);
        assert_eq!(bins[1].groups, vec!["b"]);
    }
}
