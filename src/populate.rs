//! Nodes take turns claiming their most preferred free slot.

use tracing::{trace, warn};

/// Marker for a slot that no node owns yet.
pub(crate) const UNASSIGNED: usize = usize::MAX;

/// Slot to node index. With no permutations every slot stays [`UNASSIGNED`].
pub(crate) fn populate(permutations: &[Vec<usize>], table_size: usize) -> Vec<usize> {
    let mut lookup = vec![UNASSIGNED; table_size];
    if permutations.is_empty() {
        return lookup;
    }

    let mut next = vec![0usize; permutations.len()];
    // Only a non-prime table size can exhaust a preference list before the table is full.
    let mut exhausted = vec![false; permutations.len()];
    let mut filled = 0;

    'rounds: while filled < table_size {
        let mut claimed_this_round = false;

        for (i, row) in permutations.iter().enumerate() {
            if exhausted[i] {
                continue;
            }

            let slot = loop {
                match row.get(next[i]) {
                    Some(&c) if lookup[c] == UNASSIGNED => break Some(c),
                    Some(_) => next[i] += 1,
                    None => break None,
                }
            };

            let Some(slot) = slot else {
                exhausted[i] = true;
                continue;
            };

            lookup[slot] = i;
            next[i] += 1;
            filled += 1;
            claimed_this_round = true;

            if filled == table_size {
                break 'rounds;
            }
        }

        if !claimed_this_round {
            warn!(
                table_size,
                unassigned = table_size - filled,
                "node permutations do not cover the table; is the table size prime?"
            );
            fill_remaining(&mut lookup, permutations.len());
            break;
        }
    }

    trace!(table_size, nodes = permutations.len(), "populated lookup table");
    lookup
}

fn fill_remaining(lookup: &mut [usize], nodes: usize) {
    let unassigned = lookup.iter_mut().filter(|owner| **owner == UNASSIGNED);
    for (owner, node) in unassigned.zip((0..nodes).cycle()) {
        *owner = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Crc64;
    use crate::permutation::generate;

    #[test]
    fn test_known_table() {
        let nodes = ["backend1", "backend2", "backend3"];
        let lookup = populate(&generate(&Crc64, &nodes, 7), 7);
        assert_eq!(lookup, vec![2, 0, 1, 1, 0, 2, 0]);

        let nodes = ["b1", "b2", "b3", "b4", "b5"];
        let lookup = populate(&generate(&Crc64, &nodes, 13), 13);
        assert_eq!(lookup, vec![2, 2, 1, 2, 3, 0, 4, 0, 1, 0, 4, 3, 1]);
    }

    #[test]
    fn test_round_robin_claims_first_free_slot() {
        // Node 0 prefers 0, 1, 2, ... ; node 1 prefers the same order and must skip what 0 took.
        let rows = vec![vec![0, 1, 2, 3, 4], vec![0, 1, 2, 3, 4]];
        assert_eq!(populate(&rows, 5), vec![0, 1, 0, 1, 0]);

        let rows = vec![vec![4, 3, 2, 1, 0], vec![0, 1, 2, 3, 4]];
        assert_eq!(populate(&rows, 5), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_empty_node_set_leaves_table_unassigned() {
        let lookup = populate(&[], 7);
        assert_eq!(lookup.len(), 7);
        assert!(lookup.iter().all(|s| *s == UNASSIGNED));
    }

    #[test]
    fn test_more_nodes_than_slots_still_covers() {
        let nodes: Vec<String> = (0..10).map(|i| format!("node-{}", i)).collect();
        let lookup = populate(&generate(&Crc64, &nodes, 5), 5);
        assert_eq!(lookup.len(), 5);
        // The first five nodes each claim one slot before anyone else gets a turn.
        let mut owners = lookup.clone();
        owners.sort_unstable();
        assert_eq!(owners, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_non_prime_table_size_still_covers() {
        // Both nodes only ever visit even slots.
        let rows = vec![vec![0, 2, 0, 2], vec![2, 0, 2, 0]];
        let lookup = populate(&rows, 4);
        assert!(lookup.iter().all(|s| *s != UNASSIGNED));
        assert_eq!(lookup, vec![0, 0, 1, 1]);
    }
}
