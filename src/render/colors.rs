use vello::peniko::Color;

/// Our custom color representation for easy manipulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ChartColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Convert to vello's peniko Color (AlphaColor<Srgb>).
    pub fn to_peniko(self) -> Color {
        Color::new([self.r, self.g, self.b, self.a])
    }

    /// Create a lighter version (for hover highlight).
    pub fn lighten(self, amount: f32) -> Self {
        Self {
            r: (self.r + amount).min(1.0),
            g: (self.g + amount).min(1.0),
            b: (self.b + amount).min(1.0),
            a: self.a,
        }
    }

    /// Create a darker version (for slice strokes).
    pub fn darken(self, amount: f32) -> Self {
        Self {
            r: (self.r - amount).max(0.0),
            g: (self.g - amount).max(0.0),
            b: (self.b - amount).max(0.0),
            a: self.a,
        }
    }
}

/// Ordered palette assigned to top-level branches. The host may override
/// individual branch colors; anything past the palette length falls back
/// to a name-hash hue so late branches stay distinguishable.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<ChartColor>,
}

impl Default for Palette {
    fn default() -> Self {
        // Hues spread around the wheel, skipping the muddy yellow-greens.
        let hues: [f32; 12] = [
            210.0, 25.0, 130.0, 280.0, 45.0, 190.0, 0.0, 160.0, 330.0, 95.0, 245.0, 55.0,
        ];
        Self {
            colors: hues
                .iter()
                .map(|&h| hsv_to_rgb(h / 360.0, 0.68, 0.88))
                .collect(),
        }
    }
}

impl Palette {
    pub fn from_colors(colors: Vec<ChartColor>) -> Self {
        Self { colors }
    }

    /// Color for the `index`-th top-level branch named `name`.
    pub fn color(&self, index: usize, name: &str) -> ChartColor {
        if let Some(&color) = self.colors.get(index) {
            color
        } else {
            hsv_to_rgb(hash01(name), 0.68, 0.84)
        }
    }
}

/// Per-depth fill-opacity bands: the top-level ring is fully opaque and each
/// deeper ring fades toward a base of 0.4, floored at 0.1. Band 0 belongs to
/// depth-1 arcs (the root disc is handled separately).
pub fn opacity_bands(bands: usize) -> Vec<f32> {
    const BASE: f32 = 0.4;
    let bands = bands.max(1);
    let mut out = Vec::with_capacity(bands);
    for index in (1..=bands).rev() {
        let fraction = (index as f32) * ((1.0 - BASE) / bands as f32) + BASE;
        out.push(fraction.max(0.1));
    }
    out
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> ChartColor {
    let h6 = (h * 6.0).rem_euclid(6.0);
    let i = h6.floor() as i32;
    let f = h6 - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    ChartColor { r, g, b, a: 1.0 }
}

fn hash01(s: &str) -> f32 {
    let mut h: u32 = 2166136261;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(16777619);
    }
    ((h >> 8) as f32) / ((u32::MAX >> 8) as f32)
}
