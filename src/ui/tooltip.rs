use crate::config::{CentralLabelConfig, DetailLabelConfig};
use crate::labels::{label_text, ValueFormatter};
use crate::tree::arena::{ChartTree, NodeId};

/// Information to display in the tooltip when hovering over an arc.
#[derive(Debug, PartialEq)]
pub struct TooltipInfo {
    pub display_name: String,
    pub formatted_value: String,
    /// Path from the first ring down to the hovered arc.
    pub breadcrumb: String,
}

/// Build tooltip info for a node. The root arc reports the central label
/// caption; other arcs reuse the full detail-label rendering.
pub fn build_tooltip(
    tree: &ChartTree,
    node_id: NodeId,
    detail: &DetailLabelConfig,
    central: &CentralLabelConfig,
) -> TooltipInfo {
    let node = tree.get(node_id);
    let total = tree.get(tree.root).value;

    if node_id == tree.root {
        let formatter = ValueFormatter::new(central.display_units, central.precision_clamped());
        return TooltipInfo {
            display_name: central.text.clone(),
            formatted_value: formatter.format(node.value),
            breadcrumb: String::new(),
        };
    }

    let formatter = ValueFormatter::new(detail.display_units, detail.precision_clamped());
    let text = label_text(
        detail.style,
        &node.name,
        node.value,
        total,
        &formatter,
        detail.precision_clamped(),
    );

    TooltipInfo {
        display_name: node.name.to_string(),
        formatted_value: text.combined,
        breadcrumb: build_path(tree, node_id),
    }
}

/// Path of category names from the first ring down to a node.
pub fn build_path(tree: &ChartTree, node_id: NodeId) -> String {
    let mut parts = Vec::new();
    let mut current = Some(node_id);

    while let Some(id) = current {
        if id == tree.root {
            break;
        }
        let node = tree.get(id);
        parts.push(node.name.to_string());
        current = node.parent;
    }

    parts.reverse();
    parts.join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelStyle;

    fn setup() -> (ChartTree, NodeId) {
        let mut tree = ChartTree::new();
        let east = tree.add_child(tree.root, "East");
        let leaf = tree.add_child(east, "A");
        tree.get_mut(leaf).value = 10.0;
        tree.get_mut(east).value = 15.0;
        tree.get_mut(tree.root).value = 35.0;
        (tree, leaf)
    }

    #[test]
    fn root_tooltip_uses_the_central_caption() {
        let (tree, _) = setup();
        let info = build_tooltip(
            &tree,
            tree.root,
            &DetailLabelConfig::default(),
            &CentralLabelConfig::default(),
        );
        assert_eq!(info.display_name, "Total");
        assert_eq!(info.formatted_value, "35");
        assert!(info.breadcrumb.is_empty());
    }

    #[test]
    fn arc_tooltip_carries_the_combined_label_and_path() {
        let (tree, leaf) = setup();
        let detail = DetailLabelConfig {
            style: LabelStyle::Default,
            ..Default::default()
        };
        let info = build_tooltip(&tree, leaf, &detail, &CentralLabelConfig::default());
        assert_eq!(info.display_name, "A");
        assert_eq!(info.formatted_value, "A 10 (28.57%)");
        assert_eq!(info.breadcrumb, "East / A");
    }
}
