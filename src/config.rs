use crate::labels::{DisplayUnits, LabelStyle};
use crate::render::colors::ChartColor;
use crate::ui::legend::LegendPosition;

/// Legend widget options passed through to the host legend collaborator.
#[derive(Debug, Clone)]
pub struct LegendConfig {
    pub show: bool,
    pub position: LegendPosition,
    pub font_size: f32,
    pub color: ChartColor,
    pub title: bool,
    pub title_text: String,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            show: true,
            position: LegendPosition::Top,
            font_size: 8.0,
            color: ChartColor::new(0.0, 0.0, 0.0),
            title: true,
            title_text: String::new(),
        }
    }
}

/// Arc geometry options. `corner_radius` and `padding` are cosmetic and
/// clamped; `radius` is re-clamped against the viewport at layout time.
#[derive(Debug, Clone)]
pub struct ArcConfig {
    pub radius: f64,
    pub corner_radius: f64,
    pub padding: f64,
    pub stroke_color: ChartColor,
    /// Fill of the central (root) disc.
    pub fill_color: ChartColor,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            radius: 0.0,
            corner_radius: 0.0,
            padding: 1.0,
            stroke_color: ChartColor::new(1.0, 1.0, 1.0),
            fill_color: ChartColor::new(1.0, 1.0, 1.0),
        }
    }
}

impl ArcConfig {
    pub fn corner_radius_clamped(&self) -> f64 {
        self.corner_radius.clamp(0.0, 10.0)
    }

    /// Padding clamped to [0,10] then scaled to an angular epsilon (radians).
    pub fn pad_angle(&self) -> f64 {
        self.padding.clamp(0.0, 10.0) * 0.01
    }
}

/// Per-ring name labels drawn inside the arcs.
#[derive(Debug, Clone)]
pub struct DataLabelConfig {
    pub show: bool,
    pub color: ChartColor,
    pub background_color: ChartColor,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for DataLabelConfig {
    fn default() -> Self {
        Self {
            show: false,
            color: ChartColor::new(0.0, 0.0, 0.0),
            background_color: ChartColor::new(1.0, 1.0, 1.0).with_alpha(0.0),
            font_family: "Segoe UI".into(),
            font_size: 9.0,
        }
    }
}

/// Outer leaf labels with leader lines.
#[derive(Debug, Clone)]
pub struct DetailLabelConfig {
    pub show: bool,
    pub color: ChartColor,
    pub font_size: f32,
    pub style: LabelStyle,
    pub precision: i32,
    pub display_units: DisplayUnits,
}

impl Default for DetailLabelConfig {
    fn default() -> Self {
        Self {
            show: true,
            color: ChartColor::new(0.5, 0.5, 0.5),
            font_size: 9.0,
            style: LabelStyle::Category,
            precision: 0,
            display_units: DisplayUnits::Auto,
        }
    }
}

impl DetailLabelConfig {
    pub fn precision_clamped(&self) -> usize {
        self.precision.clamp(0, 4) as usize
    }
}

/// Summary caption and aggregate value in the central disc.
#[derive(Debug, Clone)]
pub struct CentralLabelConfig {
    pub show: bool,
    pub text: String,
    pub color: ChartColor,
    pub font_family: String,
    pub font_size: f32,
    pub precision: i32,
    pub display_units: DisplayUnits,
}

impl Default for CentralLabelConfig {
    fn default() -> Self {
        Self {
            show: true,
            text: "Total".into(),
            color: ChartColor::new(0.5, 0.5, 0.5),
            font_family: "Segoe UI".into(),
            font_size: 11.0,
            precision: 0,
            display_units: DisplayUnits::Auto,
        }
    }
}

impl CentralLabelConfig {
    pub fn precision_clamped(&self) -> usize {
        self.precision.clamp(0, 4) as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationConfig {
    pub show: bool,
}

/// Full recognized configuration surface.
#[derive(Debug, Clone, Default)]
pub struct ChartConfig {
    pub legend: LegendConfig,
    pub arc: ArcConfig,
    pub data_labels: DataLabelConfig,
    pub detail_labels: DetailLabelConfig,
    pub central_label: CentralLabelConfig,
    pub animation: AnimationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_radius_and_padding_clamp() {
        let mut arc = ArcConfig::default();
        arc.corner_radius = 25.0;
        arc.padding = -3.0;
        assert_eq!(arc.corner_radius_clamped(), 10.0);
        assert_eq!(arc.pad_angle(), 0.0);
        arc.padding = 10.0;
        assert!((arc.pad_angle() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn label_precision_clamps_into_range() {
        let mut labels = DetailLabelConfig::default();
        labels.precision = 9;
        assert_eq!(labels.precision_clamped(), 4);
        labels.precision = -2;
        assert_eq!(labels.precision_clamped(), 0);
    }
}
