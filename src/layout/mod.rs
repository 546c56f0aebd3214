use std::f64::consts::{FRAC_PI_2, PI};

use vello::kurbo::{Arc, BezPath, Point, Vec2};

use crate::config::ChartConfig;
use crate::tree::arena::{ArcSpan, ChartTree, NodeId};

pub const TWO_PI: f64 = 2.0 * PI;

/// Live angle/radius scales. The layout writes abstract spans onto the tree
/// once; every arc path and label anchor reads through these scales, which
/// is what lets the focus animator re-shape the whole chart by mutating
/// three pairs of numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    /// Abstract cumulative-value window mapped onto [0, 2π].
    pub angle_domain: [f64; 2],
    /// Abstract depth window mapped onto the pixel radius range.
    pub radius_domain: [f64; 2],
    pub radius_range: [f64; 2],
    /// Power-scale exponent for ring thickness (1.0 = uniform rings).
    pub exponent: f64,
}

impl ScaleState {
    /// Full-chart state: whole [0,1] domains, rings out to `radius` pixels.
    pub fn full(radius: f64) -> Self {
        Self {
            angle_domain: [0.0, 1.0],
            radius_domain: [0.0, 1.0],
            radius_range: [0.0, radius],
            exponent: 1.0,
        }
    }

    /// Map an abstract x to radians, clamped into [0, 2π].
    pub fn angle(&self, x: f64) -> f64 {
        let [d0, d1] = self.angle_domain;
        let span = d1 - d0;
        let t = if span.abs() < f64::EPSILON {
            0.0
        } else {
            (x - d0) / span
        };
        (t * TWO_PI).clamp(0.0, TWO_PI)
    }

    /// Map an abstract y to pixels through the power scale. Inputs below the
    /// domain floor to zero; do not clamp above so outer rings can
    /// extrapolate mid-transition (arcs outside the focus are hidden).
    pub fn radius(&self, y: f64) -> f64 {
        let [d0, d1] = self.radius_domain;
        let [r0, r1] = self.radius_range;
        let k = self.exponent;
        let td0 = d0.max(0.0).powf(k);
        let td1 = d1.max(0.0).powf(k);
        let span = td1 - td0;
        let t = if span.abs() < f64::EPSILON {
            0.0
        } else {
            (y.max(0.0).powf(k) - td0) / span
        };
        (r0 + (r1 - r0) * t.max(0.0)).max(0.0)
    }

    /// Midpoint angle of a span under the current domain.
    pub fn mid_angle(&self, span: ArcSpan) -> f64 {
        let a0 = self.angle(span.x);
        let a1 = self.angle(span.x + span.dx);
        a0 + (a1 - a0) / 2.0
    }
}

/// Configured radius clamped into `[5, min(width,height)/2 - 10]`.
pub fn clamp_radius(entered: f64, width: f64, height: f64) -> f64 {
    let calculated = (width.min(height) / 2.0) - 10.0;
    if entered < 5.0 || entered > calculated {
        calculated
    } else {
        entered
    }
}

/// Effective visual radius: the clamp above, further reduced by the detail
/// label font size to reserve margin for the outer labels.
pub fn effective_radius(config: &ChartConfig, width: f64, height: f64) -> f64 {
    let mut radius = clamp_radius(config.arc.radius, width, height);
    if config.detail_labels.show {
        radius -= config.detail_labels.font_size as f64;
    }
    radius.max(5.0)
}

/// Annotate every node with its angular/radial span: a value-proportional
/// partition of [0,1] by angle, one ring per depth level by radius.
pub fn compute_spans(tree: &mut ChartTree) {
    let levels = (tree.max_depth() as usize + 1).max(1);
    let root = tree.root;
    partition_node(tree, root, 0.0, 1.0, levels);
    tracing::debug!("Layout spans computed for {} nodes, {} rings", tree.len(), levels);
}

fn partition_node(tree: &mut ChartTree, node: NodeId, x: f64, dx: f64, levels: usize) {
    let depth = tree.get(node).depth as f64;
    let total = tree.get(node).value;
    tree.get_mut(node).span = ArcSpan {
        x,
        dx,
        y: depth / levels as f64,
        dy: 1.0 / levels as f64,
    };

    let children: Vec<NodeId> = tree.children(node).collect();
    let mut cursor = x;
    for child in children {
        // Zero-valued parents give every child a zero-width span; never a
        // division by zero.
        let child_dx = if total > 0.0 {
            dx * tree.get(child).value / total
        } else {
            0.0
        };
        partition_node(tree, child, cursor, child_dx, levels);
        cursor += child_dx;
    }
}

/// Screen point at a chart angle (0 at 12 o'clock, clockwise) and radius.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.sin(), center.y - radius * angle.cos())
}

/// Build the annular-sector path for a span under the current scales.
/// `pad_angle` insets both angular edges; spans narrower than the pad
/// collapse to a hairline at their midpoint.
pub fn arc_path(span: ArcSpan, scales: &ScaleState, center: Point, pad_angle: f64) -> BezPath {
    let mut a0 = scales.angle(span.x);
    let mut a1 = scales.angle(span.x + span.dx);
    if a1 < a0 {
        std::mem::swap(&mut a0, &mut a1);
    }
    // The full-circle root disc takes no inter-slice padding.
    if a1 - a0 > pad_angle && span.dx < 1.0 {
        a0 += pad_angle / 2.0;
        a1 -= pad_angle / 2.0;
    }
    let inner = scales.radius(span.y);
    let outer = scales.radius(span.y + span.dy).max(inner);
    annular_sector(center, a0, a1, inner, outer)
}

/// Annular sector between two chart angles and two radii, approximated
/// with cubic beziers. A zero sweep yields an empty (invisible) path.
pub fn annular_sector(center: Point, a0: f64, a1: f64, r_inner: f64, r_outer: f64) -> BezPath {
    let sweep = a1 - a0;
    let mut path = BezPath::new();
    if sweep <= 0.0 || r_outer <= 0.0 {
        return path;
    }

    path.move_to(polar(center, r_outer, a0));
    let outer = Arc {
        center,
        radii: Vec2::new(r_outer, r_outer),
        start_angle: a0 - FRAC_PI_2,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    outer.to_cubic_beziers(0.1, |p1, p2, p3| {
        path.curve_to(p1, p2, p3);
    });

    if r_inner > 1e-6 {
        path.line_to(polar(center, r_inner, a1));
        let inner = Arc {
            center,
            radii: Vec2::new(r_inner, r_inner),
            start_angle: a1 - FRAC_PI_2,
            sweep_angle: -sweep,
            x_rotation: 0.0,
        };
        inner.to_cubic_beziers(0.1, |p1, p2, p3| {
            path.curve_to(p1, p2, p3);
        });
    } else {
        path.line_to(center);
    }
    path.close_path();
    path
}

/// Find the deepest node whose arc contains the given screen point under
/// the current scales. Children have higher arena indices than parents, so
/// a reverse scan returns the deepest hit first.
pub fn hit_test(tree: &ChartTree, scales: &ScaleState, center: Point, x: f64, y: f64) -> Option<NodeId> {
    let dx = x - center.x;
    let dy = y - center.y;
    let radius = (dx * dx + dy * dy).sqrt();
    let mut theta = dx.atan2(-dy);
    if theta < 0.0 {
        theta += TWO_PI;
    }

    for i in (0..tree.nodes.len()).rev() {
        let span = tree.nodes[i].span;
        if span.dx <= 0.0 && i != tree.root.index() {
            continue;
        }
        let a0 = scales.angle(span.x);
        let a1 = scales.angle(span.x + span.dx);
        let inner = scales.radius(span.y);
        let outer = scales.radius(span.y + span.dy);
        if theta >= a0 && theta < a1 && radius >= inner && radius < outer {
            return Some(NodeId(i as u32));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataView, RowIdentity, SourceRow};
    use crate::render::colors::Palette;
    use crate::tree::build_tree;

    fn sample_tree() -> ChartTree {
        let view = DataView {
            group_field: "Region".into(),
            category_fields: vec!["Sub".into()],
            rows: vec![
                SourceRow::new(RowIdentity(1), 10.0)
                    .with_key("Region", "East")
                    .with_key("Sub", "A"),
                SourceRow::new(RowIdentity(2), 5.0)
                    .with_key("Region", "East")
                    .with_key("Sub", "B"),
                SourceRow::new(RowIdentity(3), 20.0)
                    .with_key("Region", "West")
                    .with_key("Sub", "C"),
            ],
            ..Default::default()
        };
        let mut tree = build_tree(&view, &Palette::default());
        compute_spans(&mut tree);
        tree
    }

    #[test]
    fn child_spans_partition_the_parent_exactly() {
        let tree = sample_tree();
        for (i, node) in tree.nodes.iter().enumerate() {
            if node.first_child.is_none() {
                continue;
            }
            let id = NodeId(i as u32);
            let child_sum: f64 = tree.children(id).map(|c| tree.get(c).span.dx).sum();
            assert!((child_sum - node.span.dx).abs() < 1e-12);

            // No gaps: each child starts where the previous ended.
            let mut cursor = node.span.x;
            for child in tree.children(id) {
                let span = tree.get(child).span;
                assert!((span.x - cursor).abs() < 1e-12);
                cursor += span.dx;
            }
        }
    }

    #[test]
    fn one_ring_per_depth() {
        let tree = sample_tree();
        let levels = tree.max_depth() as f64 + 1.0;
        for node in &tree.nodes {
            assert!((node.span.dy - 1.0 / levels).abs() < 1e-12);
            assert!((node.span.y - node.depth as f64 / levels).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_valued_node_collapses_without_nan() {
        let mut tree = ChartTree::new();
        let a = tree.add_child(tree.root, "a");
        let b = tree.add_child(tree.root, "b");
        tree.get_mut(a).value = 0.0;
        tree.get_mut(b).value = 0.0;
        compute_spans(&mut tree);
        assert_eq!(tree.get(a).span.dx, 0.0);
        assert_eq!(tree.get(b).span.dx, 0.0);

        let scales = ScaleState::full(100.0);
        assert!(scales.angle(tree.get(a).span.x).is_finite());
    }

    #[test]
    fn radius_clamps_to_viewport() {
        // 500 configured in a 300x300 viewport clamps to min(300,300)/2 - 10.
        assert_eq!(clamp_radius(500.0, 300.0, 300.0), 140.0);
        assert_eq!(clamp_radius(2.0, 300.0, 300.0), 140.0);
        assert_eq!(clamp_radius(80.0, 300.0, 300.0), 80.0);
    }

    #[test]
    fn angle_scale_clamps_both_sides() {
        let scales = ScaleState {
            angle_domain: [0.25, 0.5],
            ..ScaleState::full(100.0)
        };
        assert_eq!(scales.angle(0.0), 0.0);
        assert_eq!(scales.angle(1.0), TWO_PI);
        assert!((scales.angle(0.375) - PI).abs() < 1e-12);
    }

    #[test]
    fn power_scale_matches_linear_at_exponent_one() {
        let scales = ScaleState::full(140.0);
        assert!((scales.radius(0.5) - 70.0).abs() < 1e-9);
        assert_eq!(scales.radius(0.0), 0.0);
        assert!((scales.radius(1.0) - 140.0).abs() < 1e-9);
    }

    #[test]
    fn hit_test_finds_deepest_arc() {
        let tree = sample_tree();
        let scales = ScaleState::full(100.0);
        let center = Point::new(0.0, 0.0);

        // West spans the last 20/35 of the circle; probe its leaf ring.
        let west = tree.children(tree.root).nth(1).unwrap();
        let leaf = tree.children(west).next().unwrap();
        let mid = scales.mid_angle(tree.get(leaf).span);
        let r = (scales.radius(tree.get(leaf).span.y)
            + scales.radius(tree.get(leaf).span.y + tree.get(leaf).span.dy))
            / 2.0;
        let p = polar(center, r, mid);
        assert_eq!(hit_test(&tree, &scales, center, p.x, p.y), Some(leaf));

        // Far outside the outer ring hits nothing.
        assert_eq!(hit_test(&tree, &scales, center, 500.0, 0.0), None);
    }

    #[test]
    fn annular_sector_degenerates_to_empty_for_zero_sweep() {
        let path = annular_sector(Point::new(0.0, 0.0), 1.0, 1.0, 10.0, 20.0);
        assert!(path.elements().is_empty());
    }
}
