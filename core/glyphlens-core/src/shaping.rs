//! Glyph-run layout and the renderer visitor it drives (made by FontLab https://www.fontlab.com/)
//!
//! A [`ShapingEngine`] owns the iteration: it decides where glyph runs start
//! and end and calls a [`TextRenderer`] once per run. Renderers only react.
//! Everything except [`TextRenderer::draw_glyph_run`] has a neutral default
//! (no-op decorations, 96 DPI, pixel snapping on, identity transform), so a
//! plain closure is a complete renderer.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rustybuzz::{Direction, UnicodeBuffer};

use crate::face::{FeatureQuery, FontFace};
use crate::script::{ScriptId, ScriptSegmentation};

pub const STANDARD_DPI: f32 = 96.0;

/// 2D affine transform laid out like a 3x2 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.m11 + y * self.m21 + self.dx,
            x * self.m12 + y * self.m22 + self.dy,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u32,
    /// Character position (not byte offset) of the cluster in the full text.
    pub cluster: u32,
    pub advance: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// One contiguous run of glyphs from a single face and script.
pub struct GlyphRun<'a> {
    pub text_position: u32,
    pub text_len: u32,
    pub script: ScriptId,
    pub bidi_level: u8,
    pub is_sideways: bool,
    pub origin: (f32, f32),
    pub font_size: f32,
    pub glyphs: &'a [ShapedGlyph],
    pub face: &'a dyn FeatureQuery,
}

/// Underline or strikethrough geometry for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub origin: (f32, f32),
    pub width: f32,
    pub thickness: f32,
    /// Distance from the baseline, positive downwards.
    pub offset: f32,
}

/// Placeholder for an object embedded in the text at U+FFFC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineObject {
    pub origin: (f32, f32),
    pub text_position: u32,
    pub is_sideways: bool,
    pub is_right_to_left: bool,
}

pub trait TextRenderer {
    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) -> Result<()>;

    fn draw_underline(&mut self, _underline: &Decoration) -> Result<()> {
        Ok(())
    }

    fn draw_strikethrough(&mut self, _strikethrough: &Decoration) -> Result<()> {
        Ok(())
    }

    fn draw_inline_object(&mut self, _object: &InlineObject) -> Result<()> {
        Ok(())
    }

    fn dpi(&self) -> f32 {
        STANDARD_DPI
    }

    fn pixel_snapping_disabled(&self) -> bool {
        false
    }

    fn transform(&self) -> Transform {
        Transform::IDENTITY
    }
}

impl<F> TextRenderer for F
where
    F: FnMut(&GlyphRun<'_>) -> Result<()>,
{
    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) -> Result<()> {
        self(run)
    }
}

/// Script analysis plus glyph-run layout.
pub trait ShapingEngine {
    fn analyze_scripts(&self, text: &str) -> ScriptSegmentation {
        ScriptSegmentation::analyze(text)
    }

    fn layout(&self, text: &str, renderer: &mut dyn TextRenderer) -> Result<()>;
}

/// Em size, in pixels at 96 DPI, that runs are laid out at.
pub const LAYOUT_FONT_SIZE: f32 = 16.0;

/// Lays text out on a single horizontal line with rustybuzz, one glyph run per
/// script segment.
pub struct RustybuzzShaper<'a> {
    face: &'a FontFace,
}

impl<'a> RustybuzzShaper<'a> {
    pub fn new(face: &'a FontFace) -> Self {
        Self { face }
    }
}

impl ShapingEngine for RustybuzzShaper<'_> {
    fn layout(&self, text: &str, renderer: &mut dyn TextRenderer) -> Result<()> {
        let face = rustybuzz::Face::from_slice(self.face.data(), self.face.index())
            .ok_or_else(|| anyhow!("rustybuzz rejected face #{}", self.face.index()))?;
        let units_per_em = f32::from(self.face.units_per_em()?.max(1));
        let segmentation = self.analyze_scripts(text);
        let chars: Vec<(usize, char)> = text.char_indices().collect();

        let transform = renderer.transform();
        let snap = !renderer.pixel_snapping_disabled();
        let scale = LAYOUT_FONT_SIZE * renderer.dpi() / STANDARD_DPI / units_per_em;
        let mut pen = 0.0f32;

        for segment in segmentation.segments() {
            let start = segment.range.start as usize;
            let end = segment.range.end() as usize;
            let byte_start = chars[start].0;
            let byte_end = chars.get(end).map_or(text.len(), |(byte, _)| *byte);
            let run_chars = &chars[start..end];

            let mut buffer = UnicodeBuffer::new();
            buffer.push_str(&text[byte_start..byte_end]);
            if !segment.script.is_neutral() {
                if let Ok(script) = rustybuzz::Script::from_str(segment.script.iso15924()) {
                    buffer.set_script(script);
                }
            }
            buffer.guess_segment_properties();
            let right_to_left = buffer.direction() == Direction::RightToLeft;

            let output = rustybuzz::shape(&face, &[], buffer);
            let glyphs: Vec<ShapedGlyph> = output
                .glyph_infos()
                .iter()
                .zip(output.glyph_positions())
                .map(|(info, pos)| {
                    let local = run_chars.partition_point(|(byte, _)| byte - byte_start < info.cluster as usize);
                    ShapedGlyph {
                        glyph_id: info.glyph_id,
                        cluster: segment.range.start + local as u32,
                        advance: pos.x_advance as f32 * scale,
                        x_offset: pos.x_offset as f32 * scale,
                        y_offset: pos.y_offset as f32 * scale,
                    }
                })
                .collect();

            let run = GlyphRun {
                text_position: segment.range.start,
                text_len: segment.range.count,
                script: segment.script,
                bidi_level: u8::from(right_to_left),
                is_sideways: false,
                origin: snap_point(transform.apply(pen, 0.0), snap),
                font_size: LAYOUT_FONT_SIZE,
                glyphs: &glyphs,
                face: self.face,
            };
            renderer
                .draw_glyph_run(&run)
                .with_context(|| format!("glyph run at character {}", segment.range.start))?;

            pen += glyphs.iter().map(|g| g.advance).sum::<f32>();
        }

        Ok(())
    }
}

fn snap_point((x, y): (f32, f32), snap: bool) -> (f32, f32) {
    if snap {
        (x.round(), y.round())
    } else {
        (x, y)
    }
}
