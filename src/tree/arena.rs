use compact_str::CompactString;

use crate::data::RowIdentity;
use crate::render::colors::ChartColor;

/// Index into the arena `Vec<ArcNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Angular/radial span in abstract coordinates: `x, dx` along the
/// cumulative-value axis in [0,1], `y, dy` along the depth axis in [0,1].
/// Written by the layout engine, read through the live scales.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArcSpan {
    pub x: f64,
    pub dx: f64,
    pub y: f64,
    pub dy: f64,
}

/// A single node of the sunburst hierarchy, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and
/// `next_sibling`.
#[derive(Debug, Clone)]
pub struct ArcNode {
    /// Group key value; the synthetic root keeps the empty string.
    pub name: CompactString,
    /// Aggregate measure: leaf rows summed, interior nodes sum of children.
    pub value: f64,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for leaves)
    pub first_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
    /// Branch color, fixed at build time from the top-level ancestor.
    pub color: ChartColor,
    /// Depth-band fill opacity, fixed at build time.
    pub opacity: f32,
    /// Selection dimming factor in [0,1]; 1.0 when unselected or selected,
    /// 0.5 when another selection dims this arc.
    pub dim: f32,
    /// Identities of contributing rows (leaf) or their union (interior).
    pub row_ids: Vec<RowIdentity>,
    pub span: ArcSpan,
}

impl ArcNode {
    fn root() -> Self {
        Self {
            name: CompactString::new(""),
            value: 0.0,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
            color: ChartColor::new(1.0, 1.0, 1.0),
            opacity: 1.0,
            dim: 1.0,
            row_ids: Vec::new(),
            span: ArcSpan::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// The sunburst hierarchy stored as a flat arena of nodes. Children always
/// have higher indices than their parents, which the aggregation pass and
/// reverse-order hit testing both rely on.
pub struct ChartTree {
    pub nodes: Vec<ArcNode>,
    pub root: NodeId,
}

impl ChartTree {
    /// Create a tree holding only the synthetic root.
    pub fn new() -> Self {
        ChartTree {
            nodes: vec![ArcNode::root()],
            root: NodeId(0),
        }
    }

    /// Add a named child under the given parent. Returns the new node's ID.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        let parent_node = &mut self.nodes[parent.index()];
        let mut node = ArcNode::root();
        node.name = CompactString::new(name);
        node.parent = Some(parent);
        node.depth = parent_node.depth + 1;
        // Prepend to parent's child list (O(1)); order is fixed up by the
        // ascending-value sort after aggregation.
        node.next_sibling = parent_node.first_child;
        parent_node.first_child = Some(new_id);
        self.nodes.push(node);
        new_id
    }

    pub fn get(&self, id: NodeId) -> &ArcNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut ArcNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the synthetic root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node in sibling-list order.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// Whether `ancestor` lies on `node`'s parent chain (or is the node).
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.index()].parent;
        }
        false
    }

    /// Deepest level present in the tree.
    pub fn max_depth(&self) -> u16 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Depth-first iteration order (parents before children).
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<NodeId> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

impl Default for ChartTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a ChartTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}
