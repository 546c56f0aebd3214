use std::f64::consts::PI;

use vello::kurbo::{Point, Rect};

use crate::config::DetailLabelConfig;
use crate::labels::{
    first_row_carries_second, label_text, truncate_to_fit, TextMeasure, ValueFormatter,
};
use crate::layout::{polar, ScaleState};
use crate::tree::arena::{ChartTree, NodeId};

/// Outer anchor ring as a fraction of the chart radius.
const ANCHOR_RING: f64 = 1.04;
/// Horizontal push from the anchor centroid to the label x position.
const LABEL_OFFSET: f64 = 20.0;
/// Leader lines stop short of the label text.
const LEADER_OFFSET: f64 = 10.0;
/// Baseline nudge, the pixel equivalent of a 0.2em dy.
const BASELINE_NUDGE: f64 = 3.0;

/// One detail label, resolved to screen coordinates. Collision and edge
/// passes flip `visible`; the scene builder draws only visible entries.
#[derive(Debug, Clone)]
pub struct PlacedLabel {
    pub node: NodeId,
    /// First-row anchor. Text grows rightward when `anchor_start`.
    pub anchor: Point,
    pub anchor_start: bool,
    pub first_row: String,
    pub second_row: Option<String>,
    pub second_anchor: Point,
    /// Leader polyline from the arc band out to the label.
    pub leader: [Point; 3],
    pub bounds: Rect,
    pub second_bounds: Option<Rect>,
    pub visible: bool,
}

/// The label in the middle of the chart: a title row and the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct CentralLabel {
    pub title: String,
    pub value: String,
    pub visible: bool,
}

/// Compute detail labels for every visible leaf arc, then run the
/// suppression passes. Labels come out in angular order. Leaves rejected
/// by the `visible` predicate (arcs outside a zoom focus) get no label.
#[allow(clippy::too_many_arguments)]
pub fn place_detail_labels<M: TextMeasure, F: Fn(NodeId) -> bool>(
    tree: &ChartTree,
    scales: &ScaleState,
    center: Point,
    radius: f64,
    viewport: (f64, f64),
    config: &DetailLabelConfig,
    formatter: &ValueFormatter,
    visible: F,
    measure: &mut M,
) -> Vec<PlacedLabel> {
    let total = tree.get(tree.root).value;
    let px = config.font_size;
    let precision = config.precision_clamped();

    let mut labels = Vec::new();
    for id in tree.descendants(tree.root) {
        let node = tree.get(id);
        if !node.is_leaf() || node.span.dx <= 0.0 || id == tree.root || !visible(id) {
            continue;
        }
        if let Some(label) = place_one(
            tree, id, scales, center, radius, viewport, config, formatter, total, px, precision,
            measure,
        ) {
            labels.push(label);
        }
    }
    suppress_overlaps(&mut labels, center, viewport);
    labels
}

#[allow(clippy::too_many_arguments)]
fn place_one<M: TextMeasure>(
    tree: &ChartTree,
    id: NodeId,
    scales: &ScaleState,
    center: Point,
    radius: f64,
    viewport: (f64, f64),
    config: &DetailLabelConfig,
    formatter: &ValueFormatter,
    total: f64,
    px: f32,
    precision: usize,
    measure: &mut M,
) -> Option<PlacedLabel> {
    let node = tree.get(id);
    let mid = scales.mid_angle(node.span);
    let sign = if mid < PI { 1.0 } else { -1.0 };

    // Anchor centroid sits just outside the outer ring.
    let anchor_ring = polar(Point::ORIGIN, ANCHOR_RING * radius, mid);
    let label_x = (anchor_ring.x.abs() + LABEL_OFFSET) * sign;
    let anchor = Point::new(
        center.x + label_x,
        center.y + anchor_ring.y + BASELINE_NUDGE,
    );

    let texts = label_text(config.style, &node.name, node.value, total, formatter, precision);

    // Each row truncates independently against the room left between the
    // label column and the viewport edge.
    let half = viewport.0 / 2.0;
    let available = (half - label_x.abs()).max(0.0) as f32;

    let first_row = truncate_to_fit(measure, &texts.primary, px, available);

    let second_row = match &texts.secondary {
        Some(second) if !first_row_carries_second(config.style, &first_row) => {
            let row = truncate_to_fit(measure, second, px, available);
            (!row.is_empty()).then_some(row)
        }
        _ => None,
    };

    let (first_width, first_height) = measure.measure(&first_row, px)?;
    // The first anchor already carries the baseline nudge.
    let second_anchor = Point::new(anchor.x, anchor.y + first_height as f64 / 2.0 + 5.0);

    let bounds = row_bounds(anchor, sign, first_width as f64, first_height as f64);
    let second_bounds = second_row.as_ref().and_then(|row| {
        let (w, h) = measure.measure(row, px)?;
        Some(row_bounds(second_anchor, sign, w as f64, h as f64))
    });

    // Leader from the outer arc band: band centroid, anchor ring, and a
    // short horizontal run toward the text.
    let band = polar(Point::ORIGIN, (0.85 + 1.0) / 2.0 * radius, mid);
    let pos1 = Point::new(center.x + anchor_ring.x, center.y + anchor_ring.y);
    let fpos = Point::new((band.x + anchor_ring.x) / 2.0, (band.y + anchor_ring.y) / 2.0);
    let fpos1 = Point::new(
        center.x + (fpos.x + anchor_ring.x) / 2.0,
        center.y + (fpos.y + anchor_ring.y) / 2.0,
    );
    let tip = Point::new(
        center.x + (anchor_ring.x.abs() + LEADER_OFFSET) * sign,
        center.y + anchor_ring.y,
    );

    Some(PlacedLabel {
        node: id,
        anchor,
        anchor_start: sign > 0.0,
        visible: !first_row.is_empty(),
        first_row,
        second_row,
        second_anchor,
        leader: [fpos1, pos1, tip],
        bounds,
        second_bounds,
    })
}

fn row_bounds(anchor: Point, sign: f64, width: f64, height: f64) -> Rect {
    let (x0, x1) = if sign > 0.0 {
        (anchor.x, anchor.x + width)
    } else {
        (anchor.x - width, anchor.x)
    };
    Rect::new(x0, anchor.y - height / 2.0, x1, anchor.y + height / 2.0)
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    !(b.x0 > a.x1 || b.x1 < a.x0 || b.y0 > a.y1 || b.y1 < a.y0)
}

fn label_hits(a: &PlacedLabel, b: &PlacedLabel) -> bool {
    if rects_overlap(a.bounds, b.bounds) {
        return true;
    }
    if let Some(sb) = a.second_bounds {
        if rects_overlap(sb, b.bounds) || b.second_bounds.is_some_and(|o| rects_overlap(sb, o)) {
            return true;
        }
    }
    if let Some(ob) = b.second_bounds {
        if rects_overlap(a.bounds, ob) {
            return true;
        }
    }
    false
}

/// Hide colliding and edge-cropped labels. On overlap the later label in
/// angular order loses, taking its leader and second row with it.
fn suppress_overlaps(labels: &mut [PlacedLabel], center: Point, viewport: (f64, f64)) {
    for i in 0..labels.len() {
        if !labels[i].visible {
            continue;
        }
        for j in (i + 1)..labels.len() {
            if labels[j].visible && label_hits(&labels[i], &labels[j]) {
                labels[j].visible = false;
            }
        }

        // Crop at the bottom edge of the viewport.
        let lowest = labels[i]
            .second_bounds
            .map_or(labels[i].bounds.y1, |b| b.y1.max(labels[i].bounds.y1));
        if lowest > viewport.1 {
            labels[i].visible = false;
            continue;
        }

        // Keep labels out of the top/bottom crop band around the chart.
        let limit = viewport.1 / 2.0 * 0.9;
        let dy = (labels[i].anchor.y - center.y).abs();
        let second_dy = (labels[i].second_anchor.y - center.y).abs();
        if dy > limit || (labels[i].second_row.is_some() && second_dy > limit) {
            labels[i].visible = false;
        }
    }
}

/// Place the central total readout. It only shows when two text rows fit
/// inside the inner disc.
pub fn central_label<M: TextMeasure>(
    title: &str,
    formatted_total: &str,
    px: f32,
    inner_disc_height: f64,
    measure: &mut M,
) -> Option<CentralLabel> {
    let (_, text_height) = measure.measure(title, px)?;
    let visible = 2.0 * text_height as f64 + 5.0 < inner_disc_height;
    Some(CentralLabel {
        title: title.to_string(),
        value: formatted_total.to_string(),
        visible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetailLabelConfig;
    use crate::labels::measure::tests::FixedAdvance;
    use crate::labels::{DisplayUnits, LabelStyle};
    use crate::layout::compute_spans;
    use crate::tree::arena::ChartTree;

    fn two_leaf_tree() -> ChartTree {
        let mut tree = ChartTree::new();
        // add_child prepends, so insert in reverse of the angular order.
        let b = tree.add_child(tree.root, "beta");
        let a = tree.add_child(tree.root, "alpha");
        tree.get_mut(a).value = 50.0;
        tree.get_mut(b).value = 50.0;
        tree.get_mut(tree.root).value = 100.0;
        compute_spans(&mut tree);
        tree
    }

    fn config(style: LabelStyle) -> DetailLabelConfig {
        DetailLabelConfig {
            style,
            ..Default::default()
        }
    }

    fn place(
        tree: &ChartTree,
        viewport: (f64, f64),
        style: LabelStyle,
    ) -> Vec<PlacedLabel> {
        let scales = ScaleState::full(100.0);
        let center = Point::new(viewport.0 / 2.0, viewport.1 / 2.0);
        let formatter = ValueFormatter::new(DisplayUnits::None, 0);
        let mut measure = FixedAdvance { advance: 6.0 };
        place_detail_labels(
            tree,
            &scales,
            center,
            100.0,
            viewport,
            &config(style),
            &formatter,
            |_| true,
            &mut measure,
        )
    }

    #[test]
    fn hemispheres_anchor_toward_their_side() {
        let tree = two_leaf_tree();
        let labels = place(&tree, (800.0, 600.0), LabelStyle::Category);
        assert_eq!(labels.len(), 2);

        // First leaf occupies [0, π): right side, text-anchor start.
        assert!(labels[0].anchor_start);
        assert!(labels[0].anchor.x > 400.0);
        // Second leaf occupies [π, 2π): left side, text-anchor end.
        assert!(!labels[1].anchor_start);
        assert!(labels[1].anchor.x < 400.0);
    }

    #[test]
    fn leader_tip_stops_short_of_the_label() {
        let tree = two_leaf_tree();
        let labels = place(&tree, (800.0, 600.0), LabelStyle::Category);
        let label = &labels[0];
        let [_, pos1, tip] = label.leader;
        assert!((tip.x - pos1.x).abs() > 0.0);
        // Tip is 10px past the anchor ring, label 20px past.
        assert!(tip.x < label.anchor.x);
    }

    #[test]
    fn cramped_viewport_blanks_the_text() {
        let tree = two_leaf_tree();
        // Chart radius 100 leaves almost no room past the anchor ring in a
        // 230px-wide viewport, and sub-four-char stubs become empty.
        let labels = place(&tree, (230.0, 600.0), LabelStyle::Category);
        for label in &labels {
            if label.first_row.is_empty() {
                assert!(!label.visible);
            }
        }
        assert!(labels.iter().any(|l| !l.visible));
    }

    #[test]
    fn default_style_splits_name_and_annotation() {
        let mut tree = ChartTree::new();
        let leaf = tree.add_child(tree.root, "averylongcategoryname");
        tree.get_mut(leaf).value = 100.0;
        tree.get_mut(tree.root).value = 100.0;
        compute_spans(&mut tree);

        let labels = place(&tree, (400.0, 600.0), LabelStyle::Default);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].first_row, "averylongcategoryname");
        assert_eq!(labels[0].second_row.as_deref(), Some("100 (100.00%)"));
    }

    #[test]
    fn category_percent_keeps_name_and_percent_on_separate_rows() {
        let tree = two_leaf_tree();
        let labels = place(&tree, (2000.0, 600.0), LabelStyle::CategoryPercent);
        assert_eq!(labels[0].first_row, "alpha");
        assert_eq!(labels[0].second_row.as_deref(), Some("50.00%"));
    }

    #[test]
    fn spaced_first_row_already_carries_the_second() {
        let mut tree = ChartTree::new();
        let leaf = tree.add_child(tree.root, "New York");
        tree.get_mut(leaf).value = 100.0;
        tree.get_mut(tree.root).value = 100.0;
        compute_spans(&mut tree);

        let labels = place(&tree, (2000.0, 600.0), LabelStyle::Both);
        assert_eq!(labels[0].first_row, "New York");
        assert!(labels[0].second_row.is_none());
    }

    #[test]
    fn second_row_sits_half_a_row_plus_gap_below_the_first() {
        let tree = two_leaf_tree();
        let labels = place(&tree, (2000.0, 600.0), LabelStyle::CategoryPercent);
        let label = &labels[0];
        assert!(label.second_row.is_some());
        let offset = label.second_anchor.y - label.anchor.y;
        assert!((offset - (9.0 / 2.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn zoomed_focus_drops_labels_outside_the_subtree() {
        use crate::anim::FocusAnimator;
        use std::time::Instant;

        let tree = two_leaf_tree();
        let alpha = tree.children(tree.root).next().unwrap();

        let mut scales = ScaleState::full(100.0);
        let mut anim = FocusAnimator::new(false);
        anim.focus_on(alpha, tree.get(alpha).span, 100.0, &mut scales, Instant::now());

        let formatter = ValueFormatter::new(DisplayUnits::None, 0);
        let mut measure = FixedAdvance { advance: 6.0 };
        let labels = place_detail_labels(
            &tree,
            &scales,
            Point::new(300.0, 300.0),
            100.0,
            (600.0, 600.0),
            &config(LabelStyle::Category),
            &formatter,
            |id| anim.node_visible(&tree, id),
            &mut measure,
        );
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].node, alpha);
        assert_eq!(labels[0].first_row, "alpha");
    }

    #[test]
    fn overlapping_labels_hide_the_later_one() {
        let mut labels = vec![
            stub_label(Point::new(100.0, 100.0)),
            stub_label(Point::new(105.0, 102.0)),
            stub_label(Point::new(400.0, 400.0)),
        ];
        suppress_overlaps(&mut labels, Point::new(300.0, 300.0), (600.0, 600.0));
        assert!(labels[0].visible);
        assert!(!labels[1].visible);
        assert!(labels[2].visible);
    }

    #[test]
    fn bottom_edge_crops_labels() {
        let mut labels = vec![stub_label(Point::new(300.0, 595.0))];
        suppress_overlaps(&mut labels, Point::new(300.0, 300.0), (600.0, 600.0));
        assert!(!labels[0].visible);
    }

    fn stub_label(anchor: Point) -> PlacedLabel {
        PlacedLabel {
            node: crate::tree::arena::NodeId(1),
            anchor,
            anchor_start: true,
            first_row: "text".into(),
            second_row: None,
            second_anchor: anchor,
            leader: [anchor; 3],
            bounds: row_bounds(anchor, 1.0, 40.0, 12.0),
            second_bounds: None,
            visible: true,
        }
    }

    #[test]
    fn central_label_needs_room_for_two_rows() {
        let mut measure = FixedAdvance { advance: 6.0 };
        let shown = central_label("Total", "35", 11.0, 60.0, &mut measure).unwrap();
        assert!(shown.visible);
        let hidden = central_label("Total", "35", 11.0, 20.0, &mut measure).unwrap();
        assert!(!hidden.visible);
    }
}
