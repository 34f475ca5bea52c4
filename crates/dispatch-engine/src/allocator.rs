//! `Allocator` (`§4.6`): proportional node-count assignment, bounded by
//! group count, with deterministic cyclic rotation for rounding
//! adjustment.

/// Assigns each feature a node count proportional to its total duration.
///
/// `durations[i]` is feature i's total seconds, `group_counts[i]` its group
/// count, and `node_count` the number of nodes to distribute. Returns one
/// count per feature, each `>= 1` and `<= max(1, group_counts[i])`.
#[must_use]
pub fn allocate(durations: &[u64], group_counts: &[usize], node_count: usize) -> Vec<usize> {
    let n = durations.len();
    if n == 0 || node_count == 0 {
        return vec![1; n];
    }

    let total: u64 = durations.iter().sum();
    if total == 0 {
        return cap_to_groups(vec![1; n], group_counts);
    }

    let raw: Vec<f64> = durations
        .iter()
        .map(|&d| (d as f64 / total as f64) * node_count as f64)
        .collect();
    let mut counts: Vec<usize> = raw.iter().map(|&r| (r.floor() as usize).max(1)).collect();
    let frac: Vec<f64> = raw.iter().map(|&r| r - r.floor()).collect();

    let sum: usize = counts.iter().sum();
    match sum.cmp(&node_count) {
        std::cmp::Ordering::Greater => reduce_over_allocation(&mut counts, &raw, sum - node_count),
        std::cmp::Ordering::Less => fill_under_allocation(&mut counts, &frac, node_count - sum),
        std::cmp::Ordering::Equal => {}
    }

    cap_to_groups(counts, group_counts)
}

fn reduce_over_allocation(counts: &mut [usize], raw: &[f64], mut excess: usize) {
    let mut candidates: Vec<usize> = (0..counts.len()).filter(|&i| counts[i] > 1).collect();
    candidates.sort_by(|&a, &b| {
        raw[a]
            .partial_cmp(&raw[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut idx = 0;
    while excess > 0 && !candidates.is_empty() {
        let target = candidates[idx % candidates.len()];
        counts[target] -= 1;
        excess -= 1;
        if counts[target] == 1 {
            candidates.remove(idx % candidates.len());
        }
        idx += 1;
    }
}

fn fill_under_allocation(counts: &mut [usize], frac: &[f64], mut deficit: usize) {
    let mut candidates: Vec<usize> = (0..counts.len()).collect();
    candidates.sort_by(|&a, &b| {
        frac[b]
            .partial_cmp(&frac[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut idx = 0;
    while deficit > 0 {
        let target = candidates[idx % candidates.len()];
        counts[target] += 1;
        deficit -= 1;
        idx += 1;
    }
}

fn cap_to_groups(mut counts: Vec<usize>, group_counts: &[usize]) -> Vec<usize> {
    for (c, &g) in counts.iter_mut().zip(group_counts.iter()) {
        if g > 0 {
            *c = (*c).min(g);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_equal_durations_split_evenly() {
        let counts = allocate(&[3600, 3600, 3600, 3600], &[1, 1, 1, 1], 4);
        assert_eq!(counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn s2_proportional_allocation_with_rounding() {
        let counts = allocate(&[3600, 1800, 600], &[4, 2, 1], 4);
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn s3_capped_by_group_count() {
        let counts = allocate(&[36000], &[2], 5);
        assert_eq!(counts, vec![2]);
    }

    #[test]
    fn zero_durations_give_one_each() {
        let counts = allocate(&[0, 0], &[3, 2], 4);
        assert_eq!(counts, vec![1, 1]);
    }

    #[test]
    fn allocation_never_exceeds_node_count() {
        let counts = allocate(&[500, 300, 100, 50], &[10, 10, 10, 10], 6);
        let sum: usize = counts.iter().sum();
        assert!(sum <= 6);
        assert!(counts.iter().all(|&c| c >= 1));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let counts = allocate(&[], &[], 4);
        assert!(counts.is_empty());
    }

    #[test]
    fn over_allocation_removal_advances_cyclic_index_unconditionally() {
        // Three candidates tied on `raw`, all starting at count 2, excess=2.
        // The cyclic index must advance every iteration, including the one
        // that drops a candidate from the rotation, or the tie-break order
        // diverges from the reference allocator.
        let mut counts = vec![2, 2, 2];
        reduce_over_allocation(&mut counts, &[5.0, 5.0, 5.0], 2);
        assert_eq!(counts, vec![1, 2, 1]);
    }
}
