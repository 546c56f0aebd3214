use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use fontdue::Font;
use std::collections::HashMap;
use std::path::PathBuf;

pub const ELLIPSIS: char = '\u{2026}';

/// Text measurement seam. Label placement only needs extents, so tests can
/// drive it with a fixed-advance stub instead of a real font.
pub trait TextMeasure {
    /// Width and height in pixels of `text` at `px`, or None when no font
    /// is available.
    fn measure(&mut self, text: &str, px: f32) -> Option<(f32, f32)>;
}

/// Truncate `text` to the widest prefix that fits `max_width` with a
/// trailing ellipsis. Results shorter than four characters collapse to an
/// empty string, matching the rule that a three-character stub tells the
/// reader nothing.
pub fn truncate_to_fit<M: TextMeasure>(
    measure: &mut M,
    text: &str,
    px: f32,
    max_width: f32,
) -> String {
    let Some((full_width, _)) = measure.measure(text, px) else {
        return String::new();
    };
    if full_width <= max_width {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    for take in (1..chars.len()).rev() {
        let mut candidate: String = chars[..take].iter().collect();
        candidate.push(ELLIPSIS);
        let Some((w, _)) = measure.measure(&candidate, px) else {
            return String::new();
        };
        if w <= max_width {
            if candidate.chars().count() < 4 {
                return String::new();
            }
            return candidate;
        }
    }
    String::new()
}

/// Rasterizing text backend over fontdue. Serves both roles the chart
/// needs: extent measurement for label placement and RGBA glyph bitmaps
/// for the scene builder.
pub struct TextRenderer {
    fonts: HashMap<String, Font>,
    layout: Layout,
}

pub struct TextRenderResult {
    pub glyphs: Vec<TextGlyph>,
    pub width: u32,
    pub height: u32,
}

pub struct TextGlyph {
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
    /// RGBA, white with the glyph coverage in alpha.
    pub bitmap: Vec<u8>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }

    pub fn add_font(&mut self, name: String, font: Font) {
        self.fonts.insert(name, font);
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn load_system_font(&mut self, name: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut candidates: Vec<PathBuf> = Vec::new();

        if let Ok(windir) = std::env::var("WINDIR") {
            candidates.push(PathBuf::from(format!("{windir}\\Fonts\\segoeui.ttf")));
            candidates.push(PathBuf::from(format!("{windir}\\Fonts\\arial.ttf")));
        }
        candidates.push(PathBuf::from("C:\\Windows\\Fonts\\segoeui.ttf"));
        candidates.push(PathBuf::from("C:\\Windows\\Fonts\\arial.ttf"));
        candidates.push(PathBuf::from("/mnt/c/Windows/Fonts/segoeui.ttf"));
        candidates.push(PathBuf::from("/mnt/c/Windows/Fonts/arial.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"));

        for path in candidates {
            let Ok(font_data) = std::fs::read(&path) else {
                continue;
            };
            if let Ok(font) = Font::from_bytes(font_data, fontdue::FontSettings::default()) {
                self.fonts.insert(name.to_string(), font);
                tracing::info!("Loaded label font from {}", path.display());
                return Ok(());
            }
        }

        Err("unable to load a system font from known locations".into())
    }

    /// Line height at `px` for the named font, from the font's own metrics.
    pub fn line_height(&self, font_name: &str, px: f32) -> Option<f32> {
        let font = self.fonts.get(font_name)?;
        let metrics = font.horizontal_line_metrics(px)?;
        Some(metrics.new_line_size)
    }

    pub fn render_text(
        &mut self,
        text: &str,
        font_name: &str,
        font_size: f32,
        max_width: Option<f32>,
    ) -> Option<TextRenderResult> {
        let font = self.fonts.get(font_name)?;

        self.layout.reset(&LayoutSettings {
            max_width,
            ..Default::default()
        });
        self.layout.append(&[font], &TextStyle::new(text, font_size, 0));

        let mut glyphs = Vec::new();
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for glyph in self.layout.glyphs() {
            let (metrics, bitmap) = font.rasterize_config(GlyphRasterConfig {
                glyph_index: glyph.key.glyph_index,
                px: font_size,
                font_hash: 0,
            });

            let mut rgba_bitmap = Vec::with_capacity(bitmap.len() * 4);
            for &gray in &bitmap {
                rgba_bitmap.push(255);
                rgba_bitmap.push(255);
                rgba_bitmap.push(255);
                rgba_bitmap.push(gray);
            }

            glyphs.push(TextGlyph {
                x: glyph.x,
                y: glyph.y,
                width: metrics.width,
                height: metrics.height,
                bitmap: rgba_bitmap,
            });

            let right = glyph.x + metrics.width as f32;
            let bottom = glyph.y + metrics.height as f32;
            width = width.max(right);
            height = height.max(bottom);
        }

        if glyphs.is_empty() {
            return None;
        }

        Some(TextRenderResult {
            glyphs,
            width: width.ceil() as u32,
            height: height.ceil() as u32,
        })
    }
}

impl TextMeasure for TextRenderer {
    fn measure(&mut self, text: &str, px: f32) -> Option<(f32, f32)> {
        let font = self.fonts.values().next()?;
        self.layout.reset(&LayoutSettings::default());
        self.layout.append(&[font], &TextStyle::new(text, px, 0));

        let mut width: f32 = 0.0;
        for glyph in self.layout.glyphs() {
            width = width.max(glyph.x + glyph.width as f32);
        }
        let height = self.layout.height();
        if text.is_empty() {
            return Some((0.0, height));
        }
        Some((width, height))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character is `advance` wide, lines are `px` tall.
    pub(crate) struct FixedAdvance {
        pub advance: f32,
    }

    impl TextMeasure for FixedAdvance {
        fn measure(&mut self, text: &str, px: f32) -> Option<(f32, f32)> {
            Some((text.chars().count() as f32 * self.advance, px))
        }
    }

    #[test]
    fn fitting_text_is_untouched() {
        let mut m = FixedAdvance { advance: 10.0 };
        assert_eq!(truncate_to_fit(&mut m, "West", 12.0, 100.0), "West");
    }

    #[test]
    fn long_text_gets_an_ellipsis() {
        let mut m = FixedAdvance { advance: 10.0 };
        // 60px fits six 10px glyphs, five of prefix plus the ellipsis.
        let out = truncate_to_fit(&mut m, "Northwest", 12.0, 60.0);
        assert_eq!(out, "North\u{2026}");
    }

    #[test]
    fn stubs_shorter_than_four_chars_become_empty() {
        let mut m = FixedAdvance { advance: 10.0 };
        assert_eq!(truncate_to_fit(&mut m, "Northwest", 12.0, 30.0), "");
    }
}
