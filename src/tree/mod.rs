pub mod aggregate;
pub mod arena;

use std::collections::HashMap;

use compact_str::CompactString;

use crate::data::{DataView, SourceRow};
use crate::render::colors::{opacity_bands, Palette};
use arena::{ChartTree, NodeId};

/// Build the sunburst hierarchy from the host's flat rows and grouping-key
/// sequence. A single recursive pass creates structure and leaf aggregates
/// together; interior sums and identity unions follow bottom-up over the
/// arena, so no two traversals ever need to agree on iteration order.
pub fn build_tree(view: &DataView, palette: &Palette) -> ChartTree {
    let mut tree = ChartTree::new();
    let seq = view.key_sequence();
    if seq.is_empty() || view.category_fields.is_empty() {
        return tree;
    }

    let rows: Vec<&SourceRow> = view
        .rows
        .iter()
        .filter(|row| row.measure.is_some())
        .collect();

    tracing::info!(
        "Building tree from {} rows ({} dropped as null) over keys {:?}",
        rows.len(),
        view.rows.len() - rows.len(),
        seq
    );

    let root = tree.root;
    partition_level(&mut tree, root, &rows, &seq, 0);

    aggregate::aggregate_values(&mut tree);
    aggregate::sort_children_by_value(&mut tree);
    assign_colors(&mut tree, view, palette);

    tracing::debug!(
        "Tree built: {} nodes, total value {}",
        tree.len(),
        tree.get(tree.root).value
    );
    tree
}

/// Partition `rows` by the grouping key at `depth`, creating one child per
/// distinct value in first-appearance order. Rows missing the key are
/// excluded from this branch. When the key sequence is exhausted the
/// current children become leaves carrying their rows' sums and identities.
fn partition_level(
    tree: &mut ChartTree,
    parent: NodeId,
    rows: &[&SourceRow],
    seq: &[&str],
    depth: usize,
) {
    let Some(&key) = seq.get(depth) else {
        return;
    };

    let mut order: Vec<CompactString> = Vec::new();
    let mut groups: HashMap<CompactString, Vec<&SourceRow>> = HashMap::new();
    for &row in rows {
        let Some(value) = row.keys.get(key) else {
            continue;
        };
        let label = if value.is_empty() {
            CompactString::new("(Blank)")
        } else {
            value.clone()
        };
        groups
            .entry(label.clone())
            .or_insert_with(|| {
                order.push(label);
                Vec::new()
            })
            .push(row);
    }

    for label in order {
        let mut subrows = groups.remove(&label).unwrap_or_default();
        // Smallest measures first; stable so equal rows keep source order.
        subrows.sort_by(|a, b| {
            let ma = a.measure.unwrap_or(0.0);
            let mb = b.measure.unwrap_or(0.0);
            ma.partial_cmp(&mb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let child = tree.add_child(parent, &label);
        if depth + 1 < seq.len() {
            partition_level(tree, child, &subrows, seq, depth + 1);
        } else {
            let node = tree.get_mut(child);
            node.value = subrows.iter().filter_map(|row| row.measure).sum();
            node.row_ids = subrows.iter().map(|row| row.identity).collect();
        }
    }
}

/// Resolve each top-level branch's color (host override, else palette by
/// position) and propagate it with the depth opacity bands to every
/// descendant. Colors and bands never change after this.
fn assign_colors(tree: &mut ChartTree, view: &DataView, palette: &Palette) {
    let bands = opacity_bands(view.category_fields.len() + 1);
    let branches: Vec<NodeId> = tree.children(tree.root).collect();
    for (index, branch) in branches.into_iter().enumerate() {
        let name = tree.get(branch).name.clone();
        let color = view
            .group_colors
            .get(&name)
            .copied()
            .unwrap_or_else(|| palette.color(index, &name));
        for id in tree.descendants(branch) {
            let depth = tree.get(id).depth as usize;
            let node = tree.get_mut(id);
            node.color = color;
            node.opacity = bands[(depth - 1).min(bands.len() - 1)];
        }
    }
}
