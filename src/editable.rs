use std::collections::HashMap;

/// A named style value stored against a range of document text.
///
/// `Indeterminate` is the sentinel returned by range queries when the style
/// varies across the queried span.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
    Indeterminate,
}

/// Style attributes keyed by name.
pub type StyleAttrs = HashMap<String, StyleValue, fxhash::FxBuildHasher>;

/// Visual caret primitive handed to the layout's background rendering
/// group: a vertical bar at `x` spanning `top..bottom`, with RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaretBar {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    pub color: [u8; 4],
}

/// The document collaborator: styled text storage the caret mutates.
///
/// All positions are char offsets in `0..=len()`.
pub trait EditableDocument {
    fn text(&self) -> &str;

    /// Length of the text in chars.
    fn len(&self) -> usize {
        self.text().chars().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `text` at `position`, applying `attrs` to the inserted span.
    fn insert_text(&mut self, position: usize, text: &str, attrs: &StyleAttrs);

    /// Deletes the chars in `[start, end)`.
    fn delete_text(&mut self, start: usize, end: usize);

    /// The named style at a single position.
    fn get_style(&self, name: &str, position: usize) -> Option<StyleValue>;

    /// The named style over `[start, end)`; [`StyleValue::Indeterminate`]
    /// when it varies across the range.
    fn get_style_range(&self, name: &str, start: usize, end: usize) -> Option<StyleValue>;

    /// Applies `attrs` to the chars in `[start, end)`.
    fn set_style(&mut self, start: usize, end: usize, attrs: &StyleAttrs);

    /// Position of the start of the paragraph containing `position`.
    fn paragraph_start(&self, position: usize) -> usize;

    /// Position of the end of the paragraph containing `position`.
    fn paragraph_end(&self, position: usize) -> usize;

    /// `(ascent, descent)` of the font in effect just before `position`,
    /// used to size the caret bar. Descent is negative below the baseline.
    fn vertical_extent(&self, position: usize) -> (f32, f32);
}

/// The incremental text layout collaborator the caret steers.
///
/// Exposes line/position geometry queries, the visible selection range, the
/// scrollable viewport, and the caret's own draw primitive. Lines and
/// positions are indices into the laid-out document owned by
/// [`document`](Self::document).
pub trait EditableLayout {
    type Document: EditableDocument;

    fn document(&self) -> &Self::Document;

    fn document_mut(&mut self) -> &mut Self::Document;

    /// Layout-space point of the caret slot at `position`. When `line` is
    /// given, the position is resolved on that specific line (relevant at
    /// wrap boundaries where one position maps to two points).
    fn point_from_position(&self, position: usize, line: Option<usize>)
    -> euclid::default::Point2D<f32>;

    /// Closest position on `line` to the given x coordinate.
    fn position_on_line(&self, line: usize, x: f32) -> usize;

    fn line_from_position(&self, position: usize) -> usize;

    fn line_from_point(&self, x: f32, y: f32) -> usize;

    /// Position of the first char on `line`.
    fn position_from_line(&self, line: usize) -> usize;

    fn line_count(&self) -> usize;

    /// Sets the visible selection to `[start, end)`; `(0, 0)` clears it.
    fn set_selection(&mut self, start: usize, end: usize);

    /// Scrolls so that `line` is inside the viewport.
    fn ensure_line_visible(&mut self, line: usize);

    /// Scrolls so that the layout-space `x` is inside the viewport.
    fn ensure_x_visible(&mut self, x: f32);

    fn view_x(&self) -> f32;

    fn set_view_x(&mut self, x: f32);

    fn view_y(&self) -> f32;

    fn set_view_y(&mut self, y: f32);

    /// Updates the caret's draw primitive in the layout's background
    /// rendering group.
    fn update_caret_bar(&mut self, bar: &CaretBar);
}
