use std::time::{Duration, Instant};

use crate::layout::ScaleState;
use crate::tree::arena::{ArcSpan, ChartTree, NodeId};

/// Focus transitions run for 600ms.
pub const FOCUS_TWEEN: Duration = Duration::from_millis(600);
/// Inner hole left under a focused non-root arc so it keeps a donut shape.
const FOCUS_HOLE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Focused(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    start: ScaleState,
    target: ScaleState,
    started: Instant,
    duration: Duration,
}

/// Drives the zoom-on-click behavior by retargeting the chart scales. A
/// focused arc stretches its span across the full circle; everything else
/// follows because arc paths read the shared scales each frame.
pub struct FocusAnimator {
    state: FocusState,
    tween: Option<Tween>,
    animate: bool,
}

impl FocusAnimator {
    pub fn new(animate: bool) -> Self {
        Self {
            state: FocusState::Idle,
            tween: None,
            animate,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn is_focused(&self) -> bool {
        matches!(self.state, FocusState::Focused(_))
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Labels are recomputed when a tween settles; while one runs they
    /// stay hidden.
    pub fn labels_suppressed(&self) -> bool {
        self.tween.is_some()
    }

    /// Zoom onto one arc. A retarget mid-flight starts from the currently
    /// interpolated scales, so the chart never jumps.
    pub fn focus_on(
        &mut self,
        node: NodeId,
        span: ArcSpan,
        radius: f64,
        scales: &mut ScaleState,
        now: Instant,
    ) {
        let hole = if span.y > 0.0 { FOCUS_HOLE } else { 0.0 };
        let target = ScaleState {
            angle_domain: [span.x, span.x + span.dx],
            radius_domain: [span.y, 1.0],
            radius_range: [hole, radius],
            exponent: scales.exponent,
        };
        self.state = FocusState::Focused(node);
        self.begin(target, scales, now);
    }

    /// Return to the full chart.
    pub fn clear_focus(&mut self, radius: f64, scales: &mut ScaleState, now: Instant) {
        self.state = FocusState::Idle;
        let target = ScaleState {
            exponent: scales.exponent,
            ..ScaleState::full(radius)
        };
        self.begin(target, scales, now);
    }

    fn begin(&mut self, target: ScaleState, scales: &mut ScaleState, now: Instant) {
        if !self.animate {
            *scales = target;
            self.tween = None;
            return;
        }
        self.tween = Some(Tween {
            start: *scales,
            target,
            started: now,
            duration: FOCUS_TWEEN,
        });
    }

    /// Drop focus and any running tween, e.g. on a data refresh.
    pub fn reset(&mut self) {
        self.state = FocusState::Idle;
        self.tween = None;
    }

    /// Advance the tween. Returns true on the tick that settles it, which
    /// is the cue to recompute labels.
    pub fn tick(&mut self, scales: &mut ScaleState, now: Instant) -> bool {
        let Some(tween) = self.tween else {
            return false;
        };
        let elapsed = now.saturating_duration_since(tween.started);
        if elapsed >= tween.duration {
            *scales = tween.target;
            self.tween = None;
            return true;
        }
        let t = ease_cubic_in_out(elapsed.as_secs_f64() / tween.duration.as_secs_f64());
        *scales = lerp_scales(&tween.start, &tween.target, t);
        false
    }

    /// Whether an arc is drawn in the current focus state: everything when
    /// idle, otherwise only the focused subtree and its ancestor chain.
    pub fn node_visible(&self, tree: &ChartTree, node: NodeId) -> bool {
        match self.state {
            FocusState::Idle => true,
            FocusState::Focused(focus) => {
                tree.is_ancestor_or_self(focus, node) || tree.is_ancestor_or_self(node, focus)
            }
        }
    }
}

fn lerp_scales(a: &ScaleState, b: &ScaleState, t: f64) -> ScaleState {
    let lerp = |x: f64, y: f64| x + (y - x) * t;
    ScaleState {
        angle_domain: [
            lerp(a.angle_domain[0], b.angle_domain[0]),
            lerp(a.angle_domain[1], b.angle_domain[1]),
        ],
        radius_domain: [
            lerp(a.radius_domain[0], b.radius_domain[0]),
            lerp(a.radius_domain[1], b.radius_domain[1]),
        ],
        radius_range: [
            lerp(a.radius_range[0], b.radius_range[0]),
            lerp(a.radius_range[1], b.radius_range[1]),
        ],
        exponent: lerp(a.exponent, b.exponent),
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        0.5 * u * u * u + 1.0
    }
}
