use std::sync::Arc;

use crate::{
    glyph::GlyphProvider,
    run::{DrawTarget, GlyphRun},
};

/// Horizontal justification of each line against the wrap width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement of the block relative to its `y` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlign {
    /// Top of the first line's ascender sits at `y`.
    Top,
    /// The block is centered on `y`.
    Center,
    /// The first line's baseline sits at `y`.
    Baseline,
    /// The last line's descender sits at `y`.
    Bottom,
}

/// Derived layout state. Mutators transition to `Stale`; readers recompute
/// on demand and transition back to `Fresh`.
enum Layout {
    Stale,
    Fresh(BlockLayout),
}

/// Geometry derived from the current text and configuration.
struct BlockLayout {
    run: GlyphRun,
    /// Char spans `(start, end)` of each laid-out line within the working
    /// text (the source text plus one trailing space).
    lines: Vec<(usize, usize)>,
    text_width: f32,
    line_height: f32,
    text_height: f32,
}

/// Simple displayable text with lazy re-layout.
///
/// **Y-axis goes up**: `y` refers to the first line's baseline and
/// successive lines step down by the line height.
///
/// Caches the packed glyph geometry so the text can be drawn every frame
/// with little cost; multiple mutations between draws incur a single
/// recompute. Give the block a wrap width to enable word-wrapping,
/// otherwise lines split on literal newlines only.
pub struct TextBlock {
    font: Arc<dyn GlyphProvider>,
    text: String,
    /// X coordinate of the left edge of the text. Pure draw offset; does
    /// not invalidate the layout.
    pub x: f32,
    /// Y coordinate of the first baseline (adjusted by the vertical
    /// alignment). Pure draw offset.
    pub y: f32,
    /// RGBA draw color in 0..=1.
    pub color: [f32; 4],
    leading: f32,
    wrap_width: Option<f32>,
    halign: HorizontalAlign,
    valign: VerticalAlign,
    layout: Layout,
}

impl TextBlock {
    /// Creates a block at the origin with no wrap width, left/baseline
    /// alignment, and white draw color. Construction does not lay anything
    /// out; the first reader does.
    pub fn new(font: Arc<dyn GlyphProvider>, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
            x: 0.0,
            y: 0.0,
            color: [1.0, 1.0, 1.0, 1.0],
            leading: 0.0,
            wrap_width: None,
            halign: HorizontalAlign::Left,
            valign: VerticalAlign::Baseline,
            layout: Layout::Stale,
        }
    }

    /// The raw text, exactly as last set. Reading it back never triggers a
    /// recompute.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text and marks the layout stale.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.layout = Layout::Stale;
    }

    /// Sets or clears the wrap width and marks the layout stale. With a
    /// width set, text is word-wrapped to fit it.
    pub fn set_width(&mut self, width: Option<f32>) {
        self.wrap_width = width;
        self.layout = Layout::Stale;
    }

    pub fn halign(&self) -> HorizontalAlign {
        self.halign
    }

    pub fn set_halign(&mut self, halign: HorizontalAlign) {
        self.halign = halign;
        self.layout = Layout::Stale;
    }

    pub fn valign(&self) -> VerticalAlign {
        self.valign
    }

    pub fn set_valign(&mut self, valign: VerticalAlign) {
        self.valign = valign;
        self.layout = Layout::Stale;
    }

    /// Extra pixels added between lines on top of ascent − descent.
    pub fn set_leading(&mut self, leading: f32) {
        self.leading = leading;
        self.layout = Layout::Stale;
    }

    /// Width of the text: the wrap width when one is set, otherwise the
    /// widest laid-out line. Recomputes the layout if stale.
    pub fn width(&mut self) -> f32 {
        self.ensure_layout();
        match self.wrap_width {
            Some(width) => width,
            None => self.cached().text_width,
        }
    }

    /// Height of the text: line height times line count. Recomputes the
    /// layout if stale.
    pub fn height(&mut self) -> f32 {
        self.ensure_layout();
        self.cached().text_height
    }

    /// Distance between successive baselines. Recomputes if stale.
    pub fn line_height(&mut self) -> f32 {
        self.ensure_layout();
        self.cached().line_height
    }

    /// Number of laid-out lines. Recomputes if stale.
    pub fn line_count(&mut self) -> usize {
        self.ensure_layout();
        self.cached().lines.len()
    }

    /// Renders the text, recomputing the layout first if stale.
    ///
    /// Each line is drawn as a sub-range of one packed glyph run, so the
    /// cost per frame is one color change plus the batched texture-run
    /// draws.
    pub fn draw(&mut self, target: &mut impl DrawTarget) {
        self.ensure_layout();
        let layout = self.cached();
        let ascent = self.font.ascent();

        let mut baseline_y = self.y;
        match self.valign {
            VerticalAlign::Bottom => baseline_y += layout.text_height - ascent,
            VerticalAlign::Center => baseline_y += layout.text_height / 2.0 - ascent,
            VerticalAlign::Top => baseline_y -= ascent,
            VerticalAlign::Baseline => {}
        }

        target.set_color(self.color);
        for &(start, end) in &layout.lines {
            let line_width = if end > start {
                layout.run.substring_width(start, end)
            } else {
                0.0
            };
            let target_width = self.wrap_width.unwrap_or(line_width);

            let mut line_x = self.x;
            match self.halign {
                HorizontalAlign::Right => line_x += target_width - line_width,
                HorizontalAlign::Center => line_x += target_width / 2.0 - line_width / 2.0,
                HorizontalAlign::Left => {}
            }

            target.push_translation(line_x, baseline_y);
            layout.run.draw_range(start, end, target);
            target.pop_translation();
            baseline_y -= layout.line_height;
        }
    }

    /// Recomputes the derived layout when stale.
    fn ensure_layout(&mut self) {
        if matches!(self.layout, Layout::Stale) {
            self.layout = Layout::Fresh(self.compute_layout());
        }
    }

    fn cached(&self) -> &BlockLayout {
        match &self.layout {
            Layout::Fresh(layout) => layout,
            Layout::Stale => unreachable!("ensure_layout must run first"),
        }
    }

    fn compute_layout(&self) -> BlockLayout {
        // The trailing space guarantees a break opportunity at the end of
        // the text and a visible caret slot past the last glyph.
        let mut working = self.text.clone();
        working.push(' ');
        let glyphs = self.font.glyphs(&working);
        let run = GlyphRun::new(&working, &glyphs, 0.0, 0.0);
        let len = run.len();

        let mut lines = Vec::new();
        let mut text_width = 0.0f32;
        let mut i = 0;

        match self.wrap_width {
            None => {
                // Split on literal newlines only; block width is the widest
                // segment.
                let chars: Vec<char> = working.chars().collect();
                while let Some(offset) = chars[i..].iter().position(|&c| c == '\n') {
                    let end = i + offset;
                    if end > i {
                        text_width = text_width.max(run.substring_width(i, end));
                    }
                    lines.push((i, end));
                    i = end + 1;
                }
                if i != len {
                    text_width = text_width.max(run.substring_width(i, len));
                    lines.push((i, len));
                }
            }
            Some(width) => {
                let chars: Vec<char> = working.chars().collect();
                let mut bp = run.find_break_index(i, width);
                while i < len && bp > i {
                    // A newline terminates its line but is excluded from
                    // the span.
                    if chars[bp - 1] == '\n' {
                        lines.push((i, bp - 1));
                    } else {
                        lines.push((i, bp));
                    }
                    i = bp;
                    bp = run.find_break_index(i, width);
                }
                // Drop the trailing segment when it only covers the
                // synthetic space.
                if i < len - 1 {
                    lines.push((i, len));
                }
            }
        }

        let line_height = self.font.ascent() - self.font.descent() + self.leading;
        let text_height = line_height * lines.len() as f32;
        log::trace!(
            "laid out {} chars into {} lines ({}x{})",
            len,
            lines.len(),
            text_width,
            text_height,
        );

        BlockLayout {
            run,
            lines,
            text_width,
            line_height,
            text_height,
        }
    }
}
