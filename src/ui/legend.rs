use compact_str::CompactString;
use vello::kurbo::Point;

use crate::config::LegendConfig;
use crate::labels::{truncate_to_fit, TextMeasure};
use crate::render::colors::ChartColor;
use crate::tree::arena::{ChartTree, NodeId};

/// Where the legend strip docks against the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    Top,
    TopCenter,
    Bottom,
    BottomCenter,
    Left,
    LeftCenter,
    Right,
    RightCenter,
}

impl LegendPosition {
    pub fn is_horizontal(self) -> bool {
        matches!(
            self,
            LegendPosition::Top
                | LegendPosition::TopCenter
                | LegendPosition::Bottom
                | LegendPosition::BottomCenter
        )
    }

    fn is_centered(self) -> bool {
        matches!(
            self,
            LegendPosition::TopCenter
                | LegendPosition::BottomCenter
                | LegendPosition::LeftCenter
                | LegendPosition::RightCenter
        )
    }
}

/// One selectable legend entry, sourced from a first-ring branch.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: CompactString,
    pub color: ChartColor,
    pub node: NodeId,
}

/// Entries come from the branches directly under the root, in angular
/// order. Deeper rings never appear in the legend.
pub fn build_legend(tree: &ChartTree) -> Vec<LegendEntry> {
    tree.children(tree.root)
        .map(|id| {
            let node = tree.get(id);
            LegendEntry {
                label: node.name.clone(),
                color: node.color,
                node: id,
            }
        })
        .collect()
}

const SWATCH: f64 = 10.0;
const SWATCH_GAP: f64 = 4.0;
const ITEM_GAP: f64 = 12.0;
const STRIP_PAD: f64 = 5.0;

/// A legend entry resolved to strip-local screen coordinates.
#[derive(Debug, Clone)]
pub struct LegendItem {
    pub entry: LegendEntry,
    pub text: String,
    pub swatch: Point,
    pub text_origin: Point,
    /// Measured width of `text`, reused by hit testing.
    pub text_width: f64,
    /// Mirrors selection dimming on the matching branch.
    pub opacity: f32,
}

/// The laid-out legend strip plus the chart area that remains.
#[derive(Debug, Clone)]
pub struct LegendLayout {
    pub items: Vec<LegendItem>,
    pub title: Option<String>,
    /// Top-left of the strip in viewport coordinates.
    pub origin: Point,
    pub size: (f64, f64),
    /// Top-left and size of the space left for the chart.
    pub chart_origin: Point,
    pub chart_size: (f64, f64),
}

impl LegendLayout {
    /// Layout with no visible legend: the chart takes the full viewport.
    pub fn hidden(viewport: (f64, f64)) -> Self {
        Self {
            items: Vec::new(),
            title: None,
            origin: Point::ORIGIN,
            size: (0.0, 0.0),
            chart_origin: Point::ORIGIN,
            chart_size: viewport,
        }
    }
}

/// Lay the legend strip out along its docked edge and carve the remaining
/// chart area out of the viewport.
pub fn layout_legend<M: TextMeasure>(
    entries: &[LegendEntry],
    config: &LegendConfig,
    viewport: (f64, f64),
    measure: &mut M,
) -> LegendLayout {
    if !config.show || entries.is_empty() {
        return LegendLayout::hidden(viewport);
    }

    let px = config.font_size;
    let title = config.title.then(|| {
        if config.title_text.is_empty() {
            "Legend".to_string()
        } else {
            config.title_text.clone()
        }
    });

    let line_height = measure
        .measure("Mg", px)
        .map_or(px as f64, |(_, h)| h as f64);
    let max_label = (viewport.0 / 4.0).max(SWATCH * 4.0) as f32;

    let mut items = Vec::with_capacity(entries.len());
    let mut cursor = STRIP_PAD;
    let horizontal = config.position.is_horizontal();

    if let Some(t) = &title {
        if horizontal {
            let (w, _) = measure.measure(t, px).unwrap_or((0.0, px));
            cursor += w as f64 + ITEM_GAP;
        } else {
            cursor += line_height + SWATCH_GAP;
        }
    }

    let mut strip_cross: f64 = line_height + 2.0 * STRIP_PAD;
    for entry in entries {
        let text = truncate_to_fit(measure, &entry.label, px, max_label);
        let (w, _) = measure.measure(&text, px).unwrap_or((0.0, px));
        if horizontal {
            items.push(LegendItem {
                entry: entry.clone(),
                text,
                swatch: Point::new(cursor, STRIP_PAD + (line_height - SWATCH) / 2.0),
                text_origin: Point::new(cursor + SWATCH + SWATCH_GAP, STRIP_PAD),
                text_width: w as f64,
                opacity: 1.0,
            });
            cursor += SWATCH + SWATCH_GAP + w as f64 + ITEM_GAP;
        } else {
            items.push(LegendItem {
                entry: entry.clone(),
                text,
                swatch: Point::new(STRIP_PAD, cursor + (line_height - SWATCH) / 2.0),
                text_origin: Point::new(STRIP_PAD + SWATCH + SWATCH_GAP, cursor),
                text_width: w as f64,
                opacity: 1.0,
            });
            cursor += line_height + SWATCH_GAP;
            let row = STRIP_PAD + SWATCH + SWATCH_GAP + w as f64 + STRIP_PAD;
            strip_cross = strip_cross.max(row);
        }
    }

    let size = if horizontal {
        (cursor.min(viewport.0), line_height + 2.0 * STRIP_PAD)
    } else {
        (strip_cross, cursor.min(viewport.1))
    };

    let (origin, chart_origin, chart_size) = dock(config.position, viewport, size);
    let origin = if config.position.is_centered() {
        if horizontal {
            Point::new(((viewport.0 - size.0) / 2.0).max(0.0), origin.y)
        } else {
            Point::new(origin.x, ((viewport.1 - size.1) / 2.0).max(0.0))
        }
    } else {
        origin
    };

    LegendLayout {
        items,
        title,
        origin,
        size,
        chart_origin,
        chart_size,
    }
}

/// Strip origin plus the chart area carved off the docked edge.
fn dock(
    position: LegendPosition,
    viewport: (f64, f64),
    size: (f64, f64),
) -> (Point, Point, (f64, f64)) {
    let (w, h) = viewport;
    match position {
        LegendPosition::Top | LegendPosition::TopCenter => (
            Point::ORIGIN,
            Point::new(0.0, size.1),
            (w, (h - size.1).max(0.0)),
        ),
        LegendPosition::Bottom | LegendPosition::BottomCenter => (
            Point::new(0.0, (h - size.1).max(0.0)),
            Point::ORIGIN,
            (w, (h - size.1).max(0.0)),
        ),
        LegendPosition::Left | LegendPosition::LeftCenter => (
            Point::ORIGIN,
            Point::new(size.0, 0.0),
            ((w - size.0).max(0.0), h),
        ),
        LegendPosition::Right | LegendPosition::RightCenter => (
            Point::new((w - size.0).max(0.0), 0.0),
            Point::ORIGIN,
            ((w - size.0).max(0.0), h),
        ),
    }
}

/// Legend item under a viewport point, for click handling.
pub fn hit_test(layout: &LegendLayout, x: f64, y: f64) -> Option<NodeId> {
    let lx = x - layout.origin.x;
    let ly = y - layout.origin.y;
    if lx < 0.0 || ly < 0.0 || lx > layout.size.0 || ly > layout.size.1 {
        return None;
    }
    for item in &layout.items {
        let x0 = item.swatch.x;
        let x1 = item.text_origin.x + item.text_width;
        let y0 = item.swatch.y.min(item.text_origin.y) - 2.0;
        let y1 = y0 + SWATCH.max(12.0) + 4.0;
        if lx >= x0 && lx <= x1 && ly >= y0 && ly <= y1 {
            return Some(item.entry.node);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::measure::tests::FixedAdvance;

    fn entries() -> Vec<LegendEntry> {
        vec![
            LegendEntry {
                label: "East".into(),
                color: ChartColor::new(0.8, 0.2, 0.2),
                node: NodeId(1),
            },
            LegendEntry {
                label: "West".into(),
                color: ChartColor::new(0.2, 0.2, 0.8),
                node: NodeId(2),
            },
        ]
    }

    fn config(position: LegendPosition) -> LegendConfig {
        LegendConfig {
            position,
            title: false,
            ..Default::default()
        }
    }

    #[test]
    fn top_legend_pushes_the_chart_down() {
        let mut m = FixedAdvance { advance: 6.0 };
        let layout = layout_legend(&entries(), &config(LegendPosition::Top), (600.0, 400.0), &mut m);
        assert!(layout.size.1 > 0.0);
        assert_eq!(layout.chart_origin.y, layout.size.1);
        assert_eq!(layout.chart_size.1, 400.0 - layout.size.1);
        assert_eq!(layout.chart_size.0, 600.0);
    }

    #[test]
    fn right_legend_narrows_the_chart() {
        let mut m = FixedAdvance { advance: 6.0 };
        let layout =
            layout_legend(&entries(), &config(LegendPosition::Right), (600.0, 400.0), &mut m);
        assert_eq!(layout.chart_origin, Point::ORIGIN);
        assert_eq!(layout.chart_size.0, 600.0 - layout.size.0);
        assert_eq!(layout.origin.x, 600.0 - layout.size.0);
    }

    #[test]
    fn centered_variants_center_the_strip() {
        let mut m = FixedAdvance { advance: 6.0 };
        let layout = layout_legend(
            &entries(),
            &config(LegendPosition::BottomCenter),
            (600.0, 400.0),
            &mut m,
        );
        let expected = (600.0 - layout.size.0) / 2.0;
        assert!((layout.origin.x - expected).abs() < 1e-9);
        assert_eq!(layout.origin.y, 400.0 - layout.size.1);
    }

    #[test]
    fn hidden_legend_leaves_the_full_viewport() {
        let mut m = FixedAdvance { advance: 6.0 };
        let mut cfg = config(LegendPosition::Top);
        cfg.show = false;
        let layout = layout_legend(&entries(), &cfg, (600.0, 400.0), &mut m);
        assert!(layout.items.is_empty());
        assert_eq!(layout.chart_size, (600.0, 400.0));
    }

    #[test]
    fn hit_boxes_follow_the_measured_text_width() {
        let mut m = FixedAdvance { advance: 6.0 };
        let layout = layout_legend(&entries(), &config(LegendPosition::Top), (600.0, 400.0), &mut m);

        // Swatch through the end of the measured text hits the entry.
        assert_eq!(hit_test(&layout, 20.0, 10.0), Some(NodeId(1)));
        assert_eq!(hit_test(&layout, 60.0, 10.0), Some(NodeId(2)));
        // The gap between items is dead space.
        assert_eq!(hit_test(&layout, 50.0, 10.0), None);
    }

    #[test]
    fn legend_lists_only_first_ring_branches() {
        let mut tree = ChartTree::new();
        let west = tree.add_child(tree.root, "West");
        let east = tree.add_child(tree.root, "East");
        tree.add_child(east, "A");

        let entries = build_legend(&tree);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].node, east);
        assert_eq!(entries[1].node, west);
        assert!(entries.iter().all(|e| e.label != "A"));
    }
}
