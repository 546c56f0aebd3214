use std::time::Instant;

use vello::kurbo::Point;
use vello::Scene;

use crate::anim::{FocusAnimator, FocusState};
use crate::config::ChartConfig;
use crate::data::{DataView, RowIdentity};
use crate::error::ChartError;
use crate::labels::measure::TextRenderer;
use crate::labels::placement::{self, CentralLabel, PlacedLabel};
use crate::labels::ValueFormatter;
use crate::layout::{self, hit_test, ScaleState};
use crate::render::colors::Palette;
use crate::render::scene::build_scene;
use crate::tree::arena::{ChartTree, NodeId};
use crate::tree::build_tree;
use crate::ui::input::ChartAction;
use crate::ui::legend::{self, LegendLayout};
use crate::ui::selection::{SelectionHost, SelectionState};
use crate::ui::tooltip::{self, TooltipInfo};

/// A context-menu request raised by a right click, for the embedding UI to
/// act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMenuRequest {
    pub node: Option<NodeId>,
}

/// The chart engine: owns the data tree, scales, focus animation,
/// selection, labels, and the scene they render into.
pub struct Chart {
    pub config: ChartConfig,
    palette: Palette,
    text: TextRenderer,
    tree: Option<ChartTree>,
    scales: ScaleState,
    animator: FocusAnimator,
    selection: SelectionState,
    legend: LegendLayout,
    detail_labels: Vec<PlacedLabel>,
    central: Option<CentralLabel>,
    scene: Scene,
    viewport: (f64, f64),
    center: Point,
    radius: f64,
    hover: Option<NodeId>,
    context_request: Option<ContextMenuRequest>,
    /// Inline message shown instead of the chart after a bad data view.
    message: Option<String>,
}

impl Chart {
    pub fn new(config: ChartConfig) -> Self {
        let mut text = TextRenderer::new();
        if let Err(err) = text.load_system_font("default") {
            tracing::warn!("No system font available, labels will be skipped: {err}");
        }
        let animate = config.animation.show;
        Self {
            config,
            palette: Palette::default(),
            text,
            tree: None,
            scales: ScaleState::full(0.0),
            animator: FocusAnimator::new(animate),
            selection: SelectionState::new(),
            legend: LegendLayout::hidden((0.0, 0.0)),
            detail_labels: Vec::new(),
            central: None,
            scene: Scene::new(),
            viewport: (0.0, 0.0),
            center: Point::ORIGIN,
            radius: 0.0,
            hover: None,
            context_request: None,
            message: None,
        }
    }

    pub fn tree(&self) -> Option<&ChartTree> {
        self.tree.as_ref()
    }

    pub fn scales(&self) -> &ScaleState {
        &self.scales
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn legend_layout(&self) -> &LegendLayout {
        &self.legend
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hover
    }

    /// Pull a pending context-menu request, if a right click raised one.
    pub fn take_context_request(&mut self) -> Option<ContextMenuRequest> {
        self.context_request.take()
    }

    /// Rebuild the chart from a fresh data view. Focus resets; the active
    /// selection is re-derived from its row identities on the new tree.
    pub fn update(&mut self, view: &DataView, viewport: (f64, f64)) -> Result<(), ChartError> {
        self.viewport = viewport;
        if let Err(err) = view.validate() {
            if err.is_inline_message() {
                tracing::warn!("Rejecting data view: {err}");
                self.message = Some(err.to_string());
                self.tree = None;
                self.legend = LegendLayout::hidden(viewport);
                self.detail_labels.clear();
                self.central = None;
            }
            return Err(err);
        }
        self.message = None;

        if view.rows.is_empty() {
            tracing::info!("Empty data view, showing landing state");
            self.tree = None;
            self.legend = LegendLayout::hidden(viewport);
            self.detail_labels.clear();
            self.central = None;
            return Ok(());
        }

        let mut tree = build_tree(view, &self.palette);
        layout::compute_spans(&mut tree);

        let rows = self.selection.selected_rows();
        self.selection.restore(&rows, &tree);
        self.selection.apply_dimming(&mut tree);

        self.tree = Some(tree);
        self.animator.reset();
        self.relayout();
        Ok(())
    }

    /// Recompute geometry for a new viewport, keeping data and selection.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width as f64, height as f64);
        if self.tree.is_some() {
            self.animator.reset();
            self.relayout();
        } else {
            self.legend = LegendLayout::hidden(self.viewport);
        }
    }

    /// Legend strip, chart area, radius, scales and labels, in that order;
    /// each depends on the previous.
    fn relayout(&mut self) {
        let Some(tree) = &self.tree else {
            return;
        };

        let entries = legend::build_legend(tree);
        self.legend = legend::layout_legend(&entries, &self.config.legend, self.viewport, &mut self.text);
        if let Some(tree) = &self.tree {
            for item in &mut self.legend.items {
                item.opacity = self.selection.legend_opacity(tree, item.entry.node);
            }
        }

        let (w, h) = self.legend.chart_size;
        self.center = Point::new(
            self.legend.chart_origin.x + w / 2.0,
            self.legend.chart_origin.y + h / 2.0,
        );
        self.radius = layout::effective_radius(&self.config, w, h);
        self.scales = ScaleState::full(self.radius);
        self.recompute_labels();
    }

    fn recompute_labels(&mut self) {
        self.detail_labels.clear();
        self.central = None;
        let Some(tree) = &self.tree else {
            return;
        };

        if self.config.detail_labels.show {
            let detail = &self.config.detail_labels;
            let formatter = ValueFormatter::new(detail.display_units, detail.precision_clamped());
            let animator = &self.animator;
            self.detail_labels = placement::place_detail_labels(
                tree,
                &self.scales,
                self.center,
                self.radius,
                self.legend.chart_size,
                detail,
                &formatter,
                |id| animator.node_visible(tree, id),
                &mut self.text,
            );
        }

        if self.config.central_label.show {
            let cfg = &self.config.central_label;
            let formatter = ValueFormatter::new(cfg.display_units, cfg.precision_clamped());
            let total = formatter.format(tree.get(tree.root).value);
            // The central disc is the first ring's inner circle.
            let levels = (tree.max_depth() as f64 + 1.0).max(1.0);
            let disc = 2.0 * self.scales.radius(1.0 / levels);
            self.central =
                placement::central_label(&cfg.text, &total, cfg.font_size, disc, &mut self.text);
        }
    }

    /// React to an input action. Arc clicks zoom when animation is on and
    /// toggle selection otherwise, matching the configured behavior.
    pub fn handle_action<H: SelectionHost>(&mut self, action: ChartAction, host: &mut H) {
        match action {
            ChartAction::Hover { node } => self.hover = node,
            ChartAction::ArcClick { node } => self.arc_click(node, host),
            ChartAction::LegendClick { node } => self.toggle_selection(node, host),
            ChartAction::BackgroundClick => {
                if self.animator.is_focused() || self.animator.is_animating() {
                    self.clear_focus();
                } else {
                    self.clear_selection(host);
                }
            }
            ChartAction::ContextMenu { node } => {
                self.context_request = Some(ContextMenuRequest { node });
            }
            ChartAction::Escape => {
                if self.animator.is_focused() || self.animator.is_animating() {
                    self.clear_focus();
                } else {
                    self.clear_selection(host);
                }
            }
            ChartAction::Resize { width, height } => self.resize(width, height),
            ChartAction::None => {}
        }
    }

    fn arc_click<H: SelectionHost>(&mut self, node: NodeId, host: &mut H) {
        if self.config.animation.show {
            let Some(tree) = &self.tree else {
                return;
            };
            // Re-clicking the focused arc or the root disc backs out.
            if node == tree.root || self.animator.state() == FocusState::Focused(node) {
                self.clear_focus();
            } else {
                let span = tree.get(node).span;
                self.animator
                    .focus_on(node, span, self.radius, &mut self.scales, Instant::now());
                self.after_focus_change();
            }
        } else {
            self.toggle_selection(node, host);
        }
    }

    fn clear_focus(&mut self) {
        self.animator
            .clear_focus(self.radius, &mut self.scales, Instant::now());
        self.after_focus_change();
    }

    fn after_focus_change(&mut self) {
        if self.animator.is_animating() {
            // Labels come back when the tween settles.
            self.detail_labels.clear();
        } else {
            self.recompute_labels();
        }
    }

    fn toggle_selection<H: SelectionHost>(&mut self, node: NodeId, host: &mut H) {
        let Some(tree) = &mut self.tree else {
            return;
        };
        self.selection.toggle_node(tree, node, host);
        self.selection.apply_dimming(tree);
        self.refresh_legend_opacity();
    }

    fn clear_selection<H: SelectionHost>(&mut self, host: &mut H) {
        self.selection.clear(host);
        if let Some(tree) = &mut self.tree {
            self.selection.apply_dimming(tree);
        }
        self.refresh_legend_opacity();
    }

    /// Re-apply a host-restored selection, e.g. from a bookmark.
    pub fn restore_selection(&mut self, rows: &[RowIdentity]) {
        let Some(tree) = &mut self.tree else {
            return;
        };
        self.selection.restore(rows, tree);
        self.selection.apply_dimming(tree);
        self.refresh_legend_opacity();
    }

    fn refresh_legend_opacity(&mut self) {
        let Some(tree) = &self.tree else {
            return;
        };
        for item in &mut self.legend.items {
            item.opacity = self.selection.legend_opacity(tree, item.entry.node);
        }
    }

    /// Advance the focus tween. Returns true while a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let was_animating = self.animator.is_animating();
        let settled = self.animator.tick(&mut self.scales, now);
        if settled {
            self.recompute_labels();
        }
        was_animating || settled
    }

    /// Arc under the given viewport point.
    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        let tree = self.tree.as_ref()?;
        hit_test(tree, &self.scales, self.center, x, y)
            .filter(|&id| self.animator.node_visible(tree, id))
    }

    pub fn tooltip_at(&self, x: f64, y: f64) -> Option<TooltipInfo> {
        let tree = self.tree.as_ref()?;
        let node = self.node_at(x, y)?;
        Some(tooltip::build_tooltip(
            tree,
            node,
            &self.config.detail_labels,
            &self.config.central_label,
        ))
    }

    /// Rebuild the scene for the current state and return the scene to
    /// present.
    pub fn build_frame(&mut self) -> &Scene {
        match &self.tree {
            Some(tree) => {
                build_scene(
                    &mut self.scene,
                    tree,
                    &self.scales,
                    self.center,
                    self.radius,
                    &self.config,
                    &self.animator,
                    &self.detail_labels,
                    self.central.as_ref(),
                    &self.legend,
                    &mut self.text,
                );
            }
            None => {
                self.scene.reset();
            }
        }
        &self.scene
    }
}
