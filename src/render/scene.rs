use std::sync::Arc;

use vello::kurbo::{Affine, BezPath, Circle, Join, Point, Rect, Stroke};
use vello::peniko::{Blob, Fill, ImageAlphaType, ImageBrush, ImageData, ImageFormat};
use vello::Scene;

use crate::anim::FocusAnimator;
use crate::config::ChartConfig;
use crate::labels::measure::{TextRenderResult, TextRenderer};
use crate::labels::placement::{CentralLabel, PlacedLabel};
use crate::labels::truncate_to_fit;
use crate::layout::{arc_path, polar, ScaleState};
use crate::render::colors::ChartColor;
use crate::tree::arena::{ArcNode, ChartTree};
use crate::ui::legend::LegendLayout;

const FONT: &str = "default";

/// Build the full chart scene: arcs, ribbon labels, detail labels with
/// leaders, the central readout, and the legend strip.
#[allow(clippy::too_many_arguments)]
pub fn build_scene(
    scene: &mut Scene,
    tree: &ChartTree,
    scales: &ScaleState,
    center: Point,
    radius: f64,
    config: &ChartConfig,
    animator: &FocusAnimator,
    detail_labels: &[PlacedLabel],
    central: Option<&CentralLabel>,
    legend: &LegendLayout,
    text: &mut TextRenderer,
) {
    scene.reset();

    draw_arcs(scene, tree, scales, center, config, animator);

    if config.data_labels.show && !animator.is_animating() {
        draw_ribbon_labels(scene, tree, scales, center, config, animator, text);
    }

    if config.detail_labels.show && !animator.labels_suppressed() {
        draw_detail_labels(scene, detail_labels, config, text);
    }

    if let Some(central) = central {
        if central.visible && !animator.is_focused() {
            draw_central_label(scene, central, center, config, text);
        }
    }

    draw_legend(scene, legend, config, text);
}

/// Per-arc fill alpha: the fixed depth band scaled by selection dimming.
pub fn arc_alpha(node: &ArcNode) -> f32 {
    (node.opacity * node.dim).clamp(0.0, 1.0)
}

fn draw_arcs(
    scene: &mut Scene,
    tree: &ChartTree,
    scales: &ScaleState,
    center: Point,
    config: &ChartConfig,
    animator: &FocusAnimator,
) {
    let pad = config.arc.pad_angle();
    // Rounded joins at the configured weight soften the arc corners.
    let stroke = Stroke::new(config.arc.corner_radius_clamped().max(1.0)).with_join(Join::Round);
    let stroke_color = config.arc.stroke_color.to_peniko();

    for i in 0..tree.len() {
        let id = crate::tree::arena::NodeId(i as u32);
        let node = tree.get(id);
        if !animator.node_visible(tree, id) {
            continue;
        }
        if node.span.dx <= 0.0 && id != tree.root {
            continue;
        }
        let path: BezPath = arc_path(node.span, scales, center, pad);
        if path.elements().is_empty() {
            continue;
        }
        let fill = if id == tree.root {
            config.arc.fill_color.with_alpha(node.dim)
        } else {
            node.color.with_alpha(arc_alpha(node))
        };
        scene.fill(Fill::NonZero, Affine::IDENTITY, fill.to_peniko(), None, &path);
        scene.stroke(&stroke, Affine::IDENTITY, stroke_color, None, &path);
    }
}

/// Category names drawn along each ring at its mid radius.
fn draw_ribbon_labels(
    scene: &mut Scene,
    tree: &ChartTree,
    scales: &ScaleState,
    center: Point,
    config: &ChartConfig,
    animator: &FocusAnimator,
    text: &mut TextRenderer,
) {
    let px = config.data_labels.font_size;
    let color = config.data_labels.color;
    let background = config.data_labels.background_color;

    for id in tree.descendants(tree.root) {
        if id == tree.root || !animator.node_visible(tree, id) {
            continue;
        }
        let node = tree.get(id);
        if node.span.dx <= 0.0 {
            continue;
        }

        let a0 = scales.angle(node.span.x);
        let a1 = scales.angle(node.span.x + node.span.dx);
        let r_in = scales.radius(node.span.y);
        let r_out = scales.radius(node.span.y + node.span.dy);
        let mid_r = (r_in + r_out) / 2.0;
        // Straight text budgeted to the arc chord at the mid radius.
        let chord = ((a1 - a0) * mid_r).max(0.0) as f32;
        let label = truncate_to_fit(text, &node.name, px, chord);
        if label.is_empty() {
            continue;
        }

        let anchor = polar(center, mid_r, scales.mid_angle(node.span));
        if let Some(result) = text.render_text(&label, FONT, px, None) {
            // The text must also fit the ring thickness.
            if result.height as f64 + 5.0 > r_out - r_in {
                continue;
            }
            let w = result.width as f64;
            let h = result.height as f64;
            let origin = Point::new(anchor.x - w / 2.0, anchor.y - h / 2.0);
            if background.a > 0.0 {
                let bg = Rect::new(origin.x - 1.0, origin.y - 1.0, origin.x + w + 1.0, origin.y + h + 1.0);
                scene.fill(Fill::NonZero, Affine::IDENTITY, background.to_peniko(), None, &bg);
            }
            draw_text_to_scene(scene, result, origin.x as f32, origin.y as f32, color);
        }
    }
}

fn draw_detail_labels(
    scene: &mut Scene,
    labels: &[PlacedLabel],
    config: &ChartConfig,
    text: &mut TextRenderer,
) {
    let px = config.detail_labels.font_size;
    let color = config.detail_labels.color;
    let leader = Stroke::new(1.0);
    let leader_color = color.to_peniko();

    for label in labels {
        if !label.visible {
            continue;
        }

        let mut path = BezPath::new();
        path.move_to(label.leader[0]);
        path.line_to(label.leader[1]);
        path.line_to(label.leader[2]);
        scene.stroke(&leader, Affine::IDENTITY, leader_color, None, &path);

        draw_row(scene, text, &label.first_row, px, label.bounds, color);
        if let (Some(row), Some(bounds)) = (&label.second_row, label.second_bounds) {
            draw_row(scene, text, row, px, bounds, color);
        }
    }
}

fn draw_row(
    scene: &mut Scene,
    text: &mut TextRenderer,
    row: &str,
    px: f32,
    bounds: Rect,
    color: ChartColor,
) {
    if let Some(result) = text.render_text(row, FONT, px, None) {
        draw_text_to_scene(scene, result, bounds.x0 as f32, bounds.y0 as f32, color);
    }
}

fn draw_central_label(
    scene: &mut Scene,
    central: &CentralLabel,
    center: Point,
    config: &ChartConfig,
    text: &mut TextRenderer,
) {
    let px = config.central_label.font_size;
    let color = config.central_label.color;
    let gap = 5.0;

    let title = text.render_text(&central.title, FONT, px, None);
    let value = text.render_text(&central.value, FONT, px, None);
    if let (Some(title), Some(value)) = (title, value) {
        let th = title.height as f64;
        let title_x = center.x - title.width as f64 / 2.0;
        let value_x = center.x - value.width as f64 / 2.0;
        draw_text_to_scene(scene, title, title_x as f32, (center.y - th - gap / 2.0) as f32, color);
        draw_text_to_scene(scene, value, value_x as f32, (center.y + gap / 2.0) as f32, color);
    }
}

fn draw_legend(
    scene: &mut Scene,
    legend: &LegendLayout,
    config: &ChartConfig,
    text: &mut TextRenderer,
) {
    if legend.items.is_empty() {
        return;
    }
    let px = config.legend.font_size;
    let color = config.legend.color;
    let shift = Affine::translate((legend.origin.x, legend.origin.y));

    if let Some(title) = &legend.title {
        if let Some(result) = text.render_text(title, FONT, px, None) {
            draw_text_to_scene(
                scene,
                result,
                (legend.origin.x + 5.0) as f32,
                (legend.origin.y + 5.0) as f32,
                color,
            );
        }
    }

    for item in &legend.items {
        let swatch = Circle::new(
            Point::new(item.swatch.x + 5.0, item.swatch.y + 5.0),
            5.0,
        );
        scene.fill(
            Fill::NonZero,
            shift,
            item.entry.color.with_alpha(item.opacity).to_peniko(),
            None,
            &swatch,
        );
        if let Some(result) = text.render_text(&item.text, FONT, px, None) {
            draw_text_to_scene(
                scene,
                result,
                (legend.origin.x + item.text_origin.x) as f32,
                (legend.origin.y + item.text_origin.y) as f32,
                color.with_alpha(item.opacity),
            );
        }
    }
}

/// Draw rendered text to a Vello scene, tinting the white glyph bitmaps.
fn draw_text_to_scene(
    scene: &mut Scene,
    text_result: TextRenderResult,
    x: f32,
    y: f32,
    color: ChartColor,
) {
    let (r, g, b) = (
        (color.r * 255.0) as u8,
        (color.g * 255.0) as u8,
        (color.b * 255.0) as u8,
    );
    for glyph in text_result.glyphs {
        if glyph.bitmap.is_empty() {
            continue;
        }

        let mut bitmap = glyph.bitmap;
        for px in bitmap.chunks_exact_mut(4) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = ((px[3] as f32) * color.a) as u8;
        }

        let glyph_image = ImageBrush::new(ImageData {
            data: Blob::new(Arc::new(bitmap)),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: glyph.width as u32,
            height: glyph.height as u32,
        });
        let transform = Affine::translate((x as f64 + glyph.x as f64, y as f64 + glyph.y as f64));
        scene.draw_image(&glyph_image, transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_alpha_combines_band_and_dimming() {
        let mut tree = ChartTree::new();
        let id = tree.add_child(tree.root, "x");
        tree.get_mut(id).opacity = 0.7;
        tree.get_mut(id).dim = 0.5;
        assert!((arc_alpha(tree.get(id)) - 0.35).abs() < 1e-6);
    }
}
