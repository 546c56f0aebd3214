use vello::kurbo::Point;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{Key, NamedKey};

use crate::layout::{hit_test, ScaleState};
use crate::tree::arena::{ChartTree, NodeId};
use crate::ui::legend::{self, LegendLayout};

/// Mouse state tracking.
#[derive(Debug, Default)]
pub struct MouseState {
    pub x: f64,
    pub y: f64,
    pub left_pressed: bool,
    pub right_pressed: bool,
}

/// Chart action produced from raw input events. What a click on an arc
/// means (zoom or select) is decided by the chart, not here.
#[derive(Debug, PartialEq, Eq)]
pub enum ChartAction {
    Hover { node: Option<NodeId> },
    ArcClick { node: NodeId },
    LegendClick { node: NodeId },
    /// Click on empty canvas, clears any selection.
    BackgroundClick,
    ContextMenu { node: Option<NodeId> },
    /// Escape backs out of focus, then selection.
    Escape,
    Resize { width: u32, height: u32 },
    None,
}

/// Process a mouse button event against the current chart geometry.
pub fn process_mouse_button(
    button: MouseButton,
    state: ElementState,
    mouse: &MouseState,
    tree: Option<&ChartTree>,
    scales: &ScaleState,
    center: Point,
    legend: &LegendLayout,
) -> ChartAction {
    if state != ElementState::Pressed {
        return ChartAction::None;
    }

    let arc = tree.and_then(|t| hit_test(t, scales, center, mouse.x, mouse.y));
    match button {
        MouseButton::Left => {
            if let Some(node) = legend::hit_test(legend, mouse.x, mouse.y) {
                ChartAction::LegendClick { node }
            } else if let Some(node) = arc {
                ChartAction::ArcClick { node }
            } else {
                ChartAction::BackgroundClick
            }
        }
        MouseButton::Right => ChartAction::ContextMenu { node: arc },
        _ => ChartAction::None,
    }
}

/// Process a keyboard event.
pub fn process_key(key: Key, state: ElementState) -> ChartAction {
    if state != ElementState::Pressed {
        return ChartAction::None;
    }

    match key.as_ref() {
        Key::Named(NamedKey::Escape) | Key::Named(NamedKey::Backspace) => ChartAction::Escape,
        _ => ChartAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_spans;

    fn chart_parts() -> (ChartTree, ScaleState, Point, LegendLayout) {
        let mut tree = ChartTree::new();
        let a = tree.add_child(tree.root, "a");
        tree.get_mut(a).value = 10.0;
        tree.get_mut(tree.root).value = 10.0;
        compute_spans(&mut tree);
        (
            tree,
            ScaleState::full(100.0),
            Point::new(300.0, 300.0),
            LegendLayout::hidden((600.0, 600.0)),
        )
    }

    #[test]
    fn left_click_on_an_arc_reports_the_node() {
        let (tree, scales, center, legend) = chart_parts();
        let mouse = MouseState {
            x: 300.0,
            y: 230.0,
            ..Default::default()
        };
        let action = process_mouse_button(
            MouseButton::Left,
            ElementState::Pressed,
            &mouse,
            Some(&tree),
            &scales,
            center,
            &legend,
        );
        assert!(matches!(action, ChartAction::ArcClick { .. }));
    }

    #[test]
    fn left_click_outside_the_chart_is_a_background_click() {
        let (tree, scales, center, legend) = chart_parts();
        let mouse = MouseState {
            x: 10.0,
            y: 10.0,
            ..Default::default()
        };
        let action = process_mouse_button(
            MouseButton::Left,
            ElementState::Pressed,
            &mouse,
            Some(&tree),
            &scales,
            center,
            &legend,
        );
        assert_eq!(action, ChartAction::BackgroundClick);
    }

    #[test]
    fn right_click_requests_a_context_menu() {
        let (tree, scales, center, legend) = chart_parts();
        let mouse = MouseState {
            x: 10.0,
            y: 10.0,
            ..Default::default()
        };
        let action = process_mouse_button(
            MouseButton::Right,
            ElementState::Pressed,
            &mouse,
            Some(&tree),
            &scales,
            center,
            &legend,
        );
        assert_eq!(action, ChartAction::ContextMenu { node: None });
    }

    #[test]
    fn releases_and_other_keys_do_nothing() {
        let (tree, scales, center, legend) = chart_parts();
        let mouse = MouseState::default();
        let action = process_mouse_button(
            MouseButton::Left,
            ElementState::Released,
            &mouse,
            Some(&tree),
            &scales,
            center,
            &legend,
        );
        assert_eq!(action, ChartAction::None);
        assert_eq!(
            process_key(Key::Named(NamedKey::Escape), ElementState::Pressed),
            ChartAction::Escape
        );
        assert_eq!(
            process_key(Key::Character("a".into()), ElementState::Pressed),
            ChartAction::None
        );
    }
}
