use std::collections::BTreeSet;

use crate::data::RowIdentity;
use crate::tree::arena::{ChartTree, NodeId};

const DIM: f32 = 0.5;

/// Host-side selection sink. `commit` hands over the rows to select and a
/// completion callback; the chart state only changes once the host calls
/// it back with the rows that actually took effect, so a host that defers
/// or rejects the commit leaves the chart consistent.
pub trait SelectionHost {
    fn commit(&mut self, rows: &[RowIdentity], done: &mut dyn FnMut(&[RowIdentity]));
}

/// Standalone host that applies every commit as-is.
#[derive(Debug, Default)]
pub struct LocalSelectionHost;

impl SelectionHost for LocalSelectionHost {
    fn commit(&mut self, rows: &[RowIdentity], done: &mut dyn FnMut(&[RowIdentity])) {
        done(rows);
    }
}

/// Current selection as a set of row identities. Row identities survive a
/// data refresh, so the selection can be re-derived on the rebuilt tree.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: BTreeSet<RowIdentity>,
    node: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn selected_rows(&self) -> Vec<RowIdentity> {
        self.selected.iter().copied().collect()
    }

    /// Toggle selection of an arc (or legend branch). Clicking the already
    /// selected node clears. Returns whether a selection is active after
    /// the host confirms.
    pub fn toggle_node<H: SelectionHost>(
        &mut self,
        tree: &ChartTree,
        node: NodeId,
        host: &mut H,
    ) -> bool {
        let deselect = self.node == Some(node) && !self.selected.is_empty();
        let rows: Vec<RowIdentity> = if deselect {
            Vec::new()
        } else {
            tree.get(node).row_ids.clone()
        };

        let mut committed: Option<Vec<RowIdentity>> = None;
        host.commit(&rows, &mut |applied| {
            committed = Some(applied.to_vec());
        });
        if let Some(applied) = committed {
            self.selected = applied.into_iter().collect();
            self.node = if self.selected.is_empty() { None } else { Some(node) };
        }
        !self.selected.is_empty()
    }

    pub fn clear<H: SelectionHost>(&mut self, host: &mut H) {
        let mut committed = false;
        host.commit(&[], &mut |_| {
            committed = true;
        });
        if committed {
            self.selected.clear();
            self.node = None;
        }
    }

    /// Restore a previously saved selection, e.g. from a host bookmark.
    /// Replaying the same rows is a no-op; an empty set clears. The anchor
    /// node is re-derived from the rebuilt tree when one still matches.
    pub fn restore(&mut self, rows: &[RowIdentity], tree: &ChartTree) {
        let incoming: BTreeSet<RowIdentity> = rows.iter().copied().collect();
        if incoming == self.selected {
            return;
        }
        self.selected = incoming;
        self.node = if self.selected.is_empty() {
            None
        } else {
            (0..tree.len()).map(|i| NodeId(i as u32)).find(|&id| {
                let node_rows: BTreeSet<RowIdentity> =
                    tree.get(id).row_ids.iter().copied().collect();
                node_rows == self.selected
            })
        };
    }

    /// Write dim factors onto the tree. With a live selection, arcs whose
    /// rows intersect it stay at full strength; interior rows aggregate
    /// from their leaves, so ancestors and descendants of the selected arc
    /// light up together.
    pub fn apply_dimming(&self, tree: &mut ChartTree) {
        if self.selected.is_empty() {
            for node in &mut tree.nodes {
                node.dim = 1.0;
            }
            return;
        }
        for node in &mut tree.nodes {
            let hit = node.row_ids.iter().any(|id| self.selected.contains(id));
            node.dim = if hit { 1.0 } else { DIM };
        }
        tree.nodes[tree.root.index()].dim = 1.0;
    }

    /// Legend swatches dim exactly like their branch arcs.
    pub fn legend_opacity(&self, tree: &ChartTree, branch: NodeId) -> f32 {
        if self.selected.is_empty() {
            return 1.0;
        }
        let hit = tree
            .get(branch)
            .row_ids
            .iter()
            .any(|id| self.selected.contains(id));
        if hit {
            1.0
        } else {
            DIM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_rows() -> (ChartTree, NodeId, NodeId, NodeId) {
        let mut tree = ChartTree::new();
        let west = tree.add_child(tree.root, "West");
        let east = tree.add_child(tree.root, "East");
        let east_a = tree.add_child(east, "A");
        tree.get_mut(east_a).row_ids = vec![RowIdentity(1)];
        tree.get_mut(east).row_ids = vec![RowIdentity(1)];
        tree.get_mut(west).row_ids = vec![RowIdentity(2)];
        tree.get_mut(tree.root).row_ids = vec![RowIdentity(1), RowIdentity(2)];
        (tree, east, east_a, west)
    }

    #[test]
    fn toggling_selects_then_clears() {
        let (tree, east, _, _) = tree_with_rows();
        let mut state = SelectionState::new();
        let mut host = LocalSelectionHost;

        assert!(state.toggle_node(&tree, east, &mut host));
        assert_eq!(state.selected_node(), Some(east));
        assert_eq!(state.selected_rows(), vec![RowIdentity(1)]);

        assert!(!state.toggle_node(&tree, east, &mut host));
        assert!(state.is_empty());
        assert_eq!(state.selected_node(), None);
    }

    #[test]
    fn dimming_spares_ancestors_and_descendants() {
        let (mut tree, east, east_a, west) = tree_with_rows();
        let mut state = SelectionState::new();
        let mut host = LocalSelectionHost;
        state.toggle_node(&tree, east, &mut host);
        state.apply_dimming(&mut tree);

        assert_eq!(tree.get(east).dim, 1.0);
        assert_eq!(tree.get(east_a).dim, 1.0);
        assert_eq!(tree.get(tree.root).dim, 1.0);
        assert_eq!(tree.get(west).dim, 0.5);
    }

    #[test]
    fn deferred_host_leaves_state_untouched() {
        struct DeferringHost;
        impl SelectionHost for DeferringHost {
            fn commit(&mut self, _rows: &[RowIdentity], _done: &mut dyn FnMut(&[RowIdentity])) {}
        }

        let (tree, east, _, _) = tree_with_rows();
        let mut state = SelectionState::new();
        assert!(!state.toggle_node(&tree, east, &mut DeferringHost));
        assert!(state.is_empty());
    }

    #[test]
    fn restore_is_idempotent_and_rebinds_the_node() {
        let (tree, east, _, _) = tree_with_rows();
        let mut state = SelectionState::new();

        state.restore(&[RowIdentity(1)], &tree);
        // The leaf carries the same row set, but parents precede children
        // in the arena, so the branch rebinds first.
        assert_eq!(state.selected_node(), Some(east));

        let before = state.selected_rows();
        state.restore(&[RowIdentity(1)], &tree);
        assert_eq!(state.selected_rows(), before);

        state.restore(&[], &tree);
        assert!(state.is_empty());
        assert_eq!(state.selected_node(), None);
    }

    #[test]
    fn legend_opacity_tracks_selection() {
        let (tree, east, _, west) = tree_with_rows();
        let mut state = SelectionState::new();
        let mut host = LocalSelectionHost;
        assert_eq!(state.legend_opacity(&tree, west), 1.0);
        state.toggle_node(&tree, east, &mut host);
        assert_eq!(state.legend_opacity(&tree, east), 1.0);
        assert_eq!(state.legend_opacity(&tree, west), 0.5);
    }
}
