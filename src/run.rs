use std::sync::Arc;

use crate::glyph::{Glyph, GlyphTexture, TextureId};

/// A single interleaved vertex of a glyph quad, in T2F_V3F order.
///
/// The packed buffer is `Pod` so callers can hand it to a GPU upload path
/// (`bytemuck::cast_slice`) without copying.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphVertex {
    pub u: f32,
    pub v: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A contiguous span of glyphs sharing one backing texture.
///
/// Runs partition the glyph sequence: contiguous, non-overlapping, covering
/// every glyph exactly once, ordered by `start`.
#[derive(Clone)]
pub struct TextureRun {
    /// Index of the first glyph in this run.
    pub start: usize,
    /// Number of glyphs in this run.
    pub len: usize,
    /// The atlas all glyphs of this run are drawn from.
    pub texture: Arc<dyn GlyphTexture>,
}

/// Render surface the glyph run issues its draw calls against.
///
/// Implemented by the graphics-context collaborator. Translations nest;
/// `pop_translation` undoes the most recent push.
pub trait DrawTarget {
    fn push_translation(&mut self, dx: f32, dy: f32);
    fn pop_translation(&mut self);
    /// Sets the current draw color as premultiplied-alpha-free RGBA in 0..=1.
    fn set_color(&mut self, color: [f32; 4]);
    fn bind_texture(&mut self, texture: TextureId);
    /// Draws textured quads from an interleaved slice, 4 vertices per quad.
    fn draw_quads(&mut self, vertices: &[GlyphVertex]);
}

/// An immutable string of glyphs that can be rendered quickly.
///
/// Ideal for single or multi-line strings in one font: the quad geometry is
/// packed once at construction and draw calls are batched per texture. To
/// wrap text, call [`find_break_index`](Self::find_break_index) for each
/// line, then [`draw_range`](Self::draw_range) per breakpoint.
///
/// Any change to text or metrics requires constructing a new run.
pub struct GlyphRun {
    chars: Vec<char>,
    vertices: Vec<GlyphVertex>,
    texture_runs: Vec<TextureRun>,
    cumulative_advance: Vec<f32>,
    width: f32,
}

impl GlyphRun {
    /// Builds the packed vertex buffer and texture-run partition.
    ///
    /// `glyphs` must correspond 1:1 with the chars of `text`; the string is
    /// positioned with the pen of the left-most glyph at `(x, y)` and `y` on
    /// the baseline.
    ///
    /// # Panics
    ///
    /// Panics if `glyphs.len()` differs from the char count of `text`.
    pub fn new(text: &str, glyphs: &[Glyph], x: f32, y: f32) -> Self {
        let chars: Vec<char> = text.chars().collect();
        assert!(
            chars.len() == glyphs.len(),
            "glyph count ({}) must match char count ({})",
            glyphs.len(),
            chars.len(),
        );

        let mut vertices = Vec::with_capacity(glyphs.len() * 4);
        let mut texture_runs: Vec<TextureRun> = Vec::new();
        let mut cumulative_advance = Vec::with_capacity(glyphs.len());
        let mut pen_x = x;

        for (i, glyph) in glyphs.iter().enumerate() {
            match texture_runs.last_mut() {
                Some(run) if run.texture.id() == glyph.texture.id() => run.len += 1,
                _ => texture_runs.push(TextureRun {
                    start: i,
                    len: 1,
                    texture: Arc::clone(&glyph.texture),
                }),
            }

            let quad = glyph.bounds;
            let t = glyph.tex_coords;
            vertices.extend_from_slice(&[
                GlyphVertex {
                    u: t[0][0],
                    v: t[0][1],
                    x: pen_x + quad.min.x,
                    y: y + quad.min.y,
                    z: 0.0,
                },
                GlyphVertex {
                    u: t[1][0],
                    v: t[1][1],
                    x: pen_x + quad.max.x,
                    y: y + quad.min.y,
                    z: 0.0,
                },
                GlyphVertex {
                    u: t[2][0],
                    v: t[2][1],
                    x: pen_x + quad.max.x,
                    y: y + quad.max.y,
                    z: 0.0,
                },
                GlyphVertex {
                    u: t[3][0],
                    v: t[3][1],
                    x: pen_x + quad.min.x,
                    y: y + quad.max.y,
                    z: 0.0,
                },
            ]);

            pen_x += glyph.advance;
            cumulative_advance.push(pen_x);
        }

        Self {
            chars,
            vertices,
            texture_runs,
            cumulative_advance,
            width: pen_x,
        }
    }

    /// Number of glyphs (== chars) in the run.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Total advance width of the run, including the construction origin.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// The packed T2F_V3F buffer, 4 vertices per glyph.
    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    pub fn texture_runs(&self) -> &[TextureRun] {
        &self.texture_runs
    }

    /// Pen x position after each glyph. Non-decreasing for non-negative
    /// advances; the last entry equals [`width`](Self::width).
    pub fn cumulative_advance(&self) -> &[f32] {
        &self.cumulative_advance
    }

    /// Finds a breakpoint within the text for a given width.
    ///
    /// Returns the largest index after `from` such that the text between
    /// `from` and the breakpoint fits within `width` pixels, breaking at the
    /// last space or zero-width-space seen before overflow. A literal
    /// newline breaks immediately after itself regardless of width. Returns
    /// `from` unchanged when there is no valid breakpoint, or when `from` is
    /// past the end of the text.
    ///
    /// Runs in O(remaining chars) against the precomputed cumulative
    /// advances; no glyph is re-measured.
    pub fn find_break_index(&self, from: usize, width: f32) -> usize {
        let mut break_index = from;
        if from >= self.chars.len() {
            return from;
        }
        let mut limit = width;
        if from > 0 {
            limit += self.cumulative_advance[from - 1];
        }
        for i in from..self.chars.len() {
            if self.cumulative_advance[i] > limit {
                return break_index;
            }
            match self.chars[i] {
                '\n' => return i + 1,
                ' ' | '\u{200b}' => break_index = i + 1,
                _ => {}
            }
        }
        break_index
    }

    /// Returns the advance width of the char slice `[from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `to <= from` or `to` is out of range; sub-width queries on
    /// empty or inverted ranges are caller contract violations.
    pub fn substring_width(&self, from: usize, to: usize) -> f32 {
        assert!(to > from, "substring range must not be empty or inverted");
        assert!(to <= self.chars.len(), "substring range out of bounds");
        let mut width = self.cumulative_advance[to - 1];
        if from > 0 {
            width -= self.cumulative_advance[from - 1];
        }
        width
    }

    /// Draws the whole run.
    pub fn draw(&self, target: &mut impl DrawTarget) {
        self.draw_range(0, self.chars.len(), target);
    }

    /// Draws the glyphs in `[from, to)`, batched per texture-run.
    ///
    /// The glyph at `from` is rendered at the run's logical x = 0 via a
    /// temporary coordinate shift of the preceding cumulative advance.
    /// Blend state is applied once and each intersecting texture-run is
    /// clipped to the range and issued as a single draw call. No-op when
    /// `from` is past the end, the range is empty, or the run has no text.
    pub fn draw_range(&self, from: usize, to: usize, target: &mut impl DrawTarget) {
        if from >= self.chars.len() || from == to || self.chars.is_empty() {
            return;
        }

        // All glyph atlases of one font share a blend state.
        self.texture_runs[0].texture.apply_blend_state();

        if from > 0 {
            target.push_translation(-self.cumulative_advance[from - 1], 0.0);
        }

        for run in &self.texture_runs {
            if run.start + run.len <= from {
                continue;
            }
            if run.start >= to {
                break;
            }
            let start = run.start.max(from);
            let end = (run.start + run.len).min(to);
            target.bind_texture(run.texture.id());
            target.draw_quads(&self.vertices[start * 4..end * 4]);
        }

        if from > 0 {
            target.pop_translation();
        }
    }
}
