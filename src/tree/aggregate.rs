use super::arena::{ChartTree, NodeId};

/// Compute aggregated values and row-identity unions for all interior nodes
/// (bottom-up). Children always have higher arena indices than their
/// parents, so a reverse scan visits every child before its parent.
pub fn aggregate_values(tree: &mut ChartTree) {
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        if tree.nodes[i].first_child.is_none() {
            continue;
        }

        let mut total: f64 = 0.0;
        let mut ids = Vec::new();
        let mut child = tree.nodes[i].first_child;
        while let Some(child_id) = child {
            let child_node = &tree.nodes[child_id.index()];
            total += child_node.value;
            ids.extend_from_slice(&child_node.row_ids);
            child = child_node.next_sibling;
        }
        tree.nodes[i].value = total;
        tree.nodes[i].row_ids = ids;
    }
}

/// Sort children of every node by aggregate value ascending, so the
/// smallest slice is placed first going clockwise. Ties keep creation
/// order (arena index), which is the original row order. Re-links the
/// sibling lists without moving nodes in the arena.
pub fn sort_children_by_value(tree: &mut ChartTree) {
    let len = tree.nodes.len();
    for i in 0..len {
        if tree.nodes[i].first_child.is_none() {
            continue;
        }

        let mut children: Vec<NodeId> = Vec::new();
        let mut child = tree.nodes[i].first_child;
        while let Some(child_id) = child {
            children.push(child_id);
            child = tree.nodes[child_id.index()].next_sibling;
        }

        children.sort_by(|a, b| {
            let va = tree.nodes[a.index()].value;
            let vb = tree.nodes[b.index()].value;
            va.partial_cmp(&vb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        tree.nodes[i].first_child = Some(children[0]);
        for w in children.windows(2) {
            tree.nodes[w[0].index()].next_sibling = Some(w[1]);
        }
        tree.nodes[children.last().unwrap().index()].next_sibling = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RowIdentity;

    #[test]
    fn interior_values_sum_children() {
        let mut tree = ChartTree::new();
        let a = tree.add_child(tree.root, "a");
        let a1 = tree.add_child(a, "a1");
        let a2 = tree.add_child(a, "a2");
        tree.get_mut(a1).value = 3.0;
        tree.get_mut(a1).row_ids = vec![RowIdentity(1)];
        tree.get_mut(a2).value = 7.0;
        tree.get_mut(a2).row_ids = vec![RowIdentity(2)];

        aggregate_values(&mut tree);

        assert_eq!(tree.get(a).value, 10.0);
        assert_eq!(tree.get(tree.root).value, 10.0);
        let mut ids = tree.get(a).row_ids.clone();
        ids.sort();
        assert_eq!(ids, vec![RowIdentity(1), RowIdentity(2)]);
    }

    #[test]
    fn children_sorted_ascending_with_stable_ties() {
        let mut tree = ChartTree::new();
        let big = tree.add_child(tree.root, "big");
        let tie_first = tree.add_child(tree.root, "tie_first");
        let tie_second = tree.add_child(tree.root, "tie_second");
        tree.get_mut(big).value = 9.0;
        tree.get_mut(tie_first).value = 2.0;
        tree.get_mut(tie_second).value = 2.0;

        aggregate_values(&mut tree);
        sort_children_by_value(&mut tree);

        let order: Vec<NodeId> = tree.children(tree.root).collect();
        assert_eq!(order, vec![tie_first, tie_second, big]);
    }
}
