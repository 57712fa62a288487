pub mod blink;
pub mod boundary;

use std::time::Duration;

use crate::{
    caret::blink::{Scheduler, TimerToken},
    editable::{CaretBar, EditableDocument, EditableLayout, StyleAttrs, StyleValue},
};

/// Abstract caret motion, decoupled from platform key codes.
///
/// The owning event source maps its keyboard events onto these and feeds
/// them to [`Caret::on_text_motion`] / [`Caret::on_text_motion_select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMotion {
    /// Delete the selection, or one char behind the caret.
    Backspace,
    /// Delete the selection, or one char ahead of the caret.
    Delete,
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    FileStart,
    FileEnd,
    NextWord,
    PreviousWord,
}

/// Visible text insertion marker for an incremental text layout.
///
/// The caret is drawn as a single vertical bar at the document `position`.
/// If `mark` is not `None`, it gives the unmoving end of the current text
/// selection, and the layout's visible selection is kept in sync with
/// `mark` and `position`.
///
/// The caret owns its layout (which owns the document) and an injected
/// [`Scheduler`] for the blink timer and click timing. The owning event
/// source forwards keyboard, text, mouse and activation events to the
/// `on_*` handlers, and routes the blink timer's firings to
/// [`on_blink_tick`](Self::on_blink_tick); double- and triple-clicks are
/// reconstructed internally from press timing.
pub struct Caret<L: EditableLayout, S: Scheduler> {
    layout: L,
    scheduler: S,
    position: usize,
    mark: Option<usize>,
    visible: bool,
    blink_phase: bool,
    active: bool,
    click_count: u32,
    click_time: Duration,
    blink_timer: Option<TimerToken>,
    /// Remembered x pixel for vertical navigation across lines of
    /// differing width.
    ideal_x: Option<f32>,
    /// Line pinned while navigating vertically; cleared by any update that
    /// resolves the line from the position again.
    ideal_line: Option<usize>,
    /// Styles applied to the next inserted text while no selection exists.
    next_attributes: StyleAttrs,
    bar: CaretBar,
}

impl<L: EditableLayout, S: Scheduler> Caret<L, S> {
    /// Blink period of the caret bar.
    pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

    /// Maximum delay between presses counted as one multi-click.
    const CLICK_INTERVAL: Duration = Duration::from_millis(250);

    /// Pixels to pan the viewport per mouse scroll wheel notch.
    pub const SCROLL_INCREMENT: f32 = 16.0;

    /// Creates a caret over `layout` at position 0, visible and blinking.
    pub fn new(layout: L, scheduler: S) -> Self {
        let mut caret = Self {
            layout,
            scheduler,
            position: 0,
            mark: None,
            visible: false,
            blink_phase: true,
            active: true,
            click_count: 0,
            click_time: Duration::ZERO,
            blink_timer: None,
            ideal_x: None,
            ideal_line: None,
            next_attributes: StyleAttrs::default(),
            bar: CaretBar {
                x: 0.0,
                top: 0.0,
                bottom: 0.0,
                color: [0, 0, 0, 255],
            },
        };
        caret.set_visible(true);
        caret
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ---- visibility & blinking ----

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the caret.
    ///
    /// Showing restarts the blink timer with the phase primed so the caret
    /// is immediately solid; hiding cancels the timer and blanks the bar.
    /// The caret stays hidden while inactive regardless of this flag.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(token) = self.blink_timer.take() {
            self.scheduler.cancel(token);
        }
        if visible && self.active && !Self::BLINK_PERIOD.is_zero() {
            self.blink_timer = Some(self.scheduler.schedule_repeating(Self::BLINK_PERIOD));
            // Flipped solid by the immediate tick below.
            self.blink_phase = false;
        }
        self.on_blink_tick();
    }

    /// One firing of the blink timer: flips the blink phase and applies the
    /// resulting alpha to the caret bar.
    pub fn on_blink_tick(&mut self) {
        self.blink_phase = !self.blink_phase;
        let alpha = if self.visible && self.active && self.blink_phase {
            255
        } else {
            0
        };
        self.bar.color[3] = alpha;
        self.layout.update_caret_bar(&self.bar);
    }

    /// Any interactive action shows the caret solid and restarts the blink.
    fn nudge(&mut self) {
        self.set_visible(true);
    }

    pub fn color(&self) -> [u8; 3] {
        [self.bar.color[0], self.bar.color[1], self.bar.color[2]]
    }

    pub fn set_color(&mut self, color: [u8; 3]) {
        self.bar.color[..3].copy_from_slice(&color);
        self.layout.update_caret_bar(&self.bar);
    }

    // ---- position, mark, line ----

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the caret to `index`.
    ///
    /// Clears pending style attributes, recomputes the caret bar, updates
    /// the visible selection if a mark is set, and scrolls the caret's line
    /// and x into view.
    pub fn set_position(&mut self, index: usize) {
        self.position = index;
        self.next_attributes.clear();
        self.update(None, true);
    }

    /// The unmoving end of the selection, or `None` when there is no
    /// selection.
    pub fn mark(&self) -> Option<usize> {
        self.mark
    }

    /// Sets or clears the selection anchor. The layout's visible selection
    /// becomes `[min, max)` of mark and position, or is cleared.
    pub fn set_mark(&mut self, mark: Option<usize>) {
        self.mark = mark;
        self.update(self.ideal_line, true);
        if mark.is_none() {
            self.layout.set_selection(0, 0);
        }
    }

    /// Index of the line containing the caret.
    pub fn line(&self) -> usize {
        match self.ideal_line {
            Some(line) => line,
            None => self.layout.line_from_position(self.position),
        }
    }

    /// Moves the caret to `line`, keeping the closest possible x offset.
    ///
    /// The first vertical move records the current x as the ideal x; later
    /// moves reuse it so navigation through lines of differing width stays
    /// visually aligned.
    pub fn set_line(&mut self, line: usize) {
        let ideal_x = match self.ideal_x {
            Some(x) => x,
            None => self.layout.point_from_position(self.position, None).x,
        };
        self.ideal_x = Some(ideal_x);
        self.position = self.layout.position_on_line(line, ideal_x);
        self.update(Some(line), false);
    }

    // ---- styles ----

    /// The named style at the caret.
    ///
    /// Over a selection this queries the whole range and may return
    /// [`StyleValue::Indeterminate`]; with no selection, a pending
    /// next-input attribute takes precedence over the document.
    pub fn get_style(&self, name: &str) -> Option<StyleValue> {
        if let Some(mark) = self.mark
            && mark != self.position
        {
            let start = self.position.min(mark);
            let end = self.position.max(mark);
            return self.layout.document().get_style_range(name, start, end);
        }

        if let Some(value) = self.next_attributes.get(name) {
            return Some(value.clone());
        }
        self.layout.document().get_style(name, self.position)
    }

    /// Sets styles at the caret: immediately over a selection, otherwise
    /// remembered and applied to the next inserted text.
    pub fn set_style(&mut self, attrs: &StyleAttrs) {
        match self.mark {
            None => {}
            Some(mark) if mark == self.position => {}
            Some(mark) => {
                let start = self.position.min(mark);
                let end = self.position.max(mark);
                self.layout.document_mut().set_style(start, end, attrs);
                return;
            }
        }
        self.next_attributes
            .extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    // ---- selection editing ----

    fn delete_selection(&mut self) {
        let Some(mark) = self.mark else {
            return;
        };
        let start = self.position.min(mark);
        let end = self.position.max(mark);
        self.layout.document_mut().delete_text(start, end);
        self.position = start;
        self.mark = None;
        self.layout.set_selection(0, 0);
    }

    /// Moves the caret close to the given point, clearing the selection.
    pub fn move_to_point(&mut self, x: f32, y: f32) {
        let line = self.layout.line_from_point(x, y);
        self.mark = None;
        self.layout.set_selection(0, 0);
        self.position = self.layout.position_on_line(line, x);
        self.update(Some(line), true);
        self.next_attributes.clear();
    }

    /// Moves the caret close to the given point while keeping the mark.
    pub fn select_to_point(&mut self, x: f32, y: f32) {
        let line = self.layout.line_from_point(x, y);
        self.position = self.layout.position_on_line(line, x);
        self.update(Some(line), true);
        self.next_attributes.clear();
    }

    /// Selects the word under the given point.
    pub fn select_word(&mut self, x: f32, y: f32) {
        let line = self.layout.line_from_point(x, y);
        let point_position = self.layout.position_on_line(line, x);
        let (word_start, word_end) = {
            let document = self.layout.document();
            let text = document.text();
            (
                boundary::previous_word_start(text, point_position + 1).unwrap_or(0),
                boundary::next_word_start(text, point_position).unwrap_or(document.len()),
            )
        };
        self.set_mark(Some(word_start));
        self.position = word_end;
        self.update(Some(line), true);
        self.next_attributes.clear();
    }

    /// Selects the paragraph under the given point.
    pub fn select_paragraph(&mut self, x: f32, y: f32) {
        let line = self.layout.line_from_point(x, y);
        let point_position = self.layout.position_on_line(line, x);
        let start = self.layout.document().paragraph_start(point_position);
        let end = self.layout.document().paragraph_end(point_position);
        self.set_mark(Some(start));
        self.position = end;
        self.update(Some(line), true);
        self.next_attributes.clear();
    }

    /// Recomputes the caret bar, syncs the visible selection, and scrolls
    /// the caret into view.
    ///
    /// With `line` given, that line stays pinned as the ideal line for
    /// vertical navigation; without it the line is resolved from the
    /// position and the pin is dropped.
    fn update(&mut self, line: Option<usize>, update_ideal_x: bool) {
        let line = match line {
            None => {
                self.ideal_line = None;
                self.layout.line_from_position(self.position)
            }
            Some(line) => {
                self.ideal_line = Some(line);
                line
            }
        };

        let point = self.layout.point_from_position(self.position, Some(line));
        if update_ideal_x {
            self.ideal_x = Some(point.x);
        }

        let x = point.x - self.layout.view_x();
        let y = point.y - self.layout.view_y();
        let (ascent, descent) = self
            .layout
            .document()
            .vertical_extent(self.position.saturating_sub(1));
        self.bar.x = x;
        self.bar.top = y + ascent;
        self.bar.bottom = y + descent;
        self.layout.update_caret_bar(&self.bar);

        if let Some(mark) = self.mark {
            self.layout
                .set_selection(self.position.min(mark), self.position.max(mark));
        }

        self.layout.ensure_line_visible(line);
        self.layout.ensure_x_visible(x);
    }

    // ---- event handlers ----

    /// Handles typed text: replaces the selection if one exists, then
    /// inserts at the caret with any pending style attributes. Carriage
    /// returns are normalized to newlines.
    pub fn on_text(&mut self, text: &str) {
        if self.mark.is_some() {
            self.delete_selection();
        }

        let text = text.replace('\r', "\n");
        self.layout
            .document_mut()
            .insert_text(self.position, &text, &self.next_attributes);
        self.position += text.chars().count();
        self.nudge();
        self.update(None, true);
    }

    /// Handles a caret motion. Any motion other than backspace/delete
    /// clears an existing selection.
    pub fn on_text_motion(&mut self, motion: TextMotion) {
        self.text_motion(motion, false);
    }

    /// Handles a selecting caret motion: anchors the mark at the current
    /// position (if unset), then applies the motion, growing or shrinking
    /// the selection.
    pub fn on_text_motion_select(&mut self, motion: TextMotion) {
        if self.mark.is_none() {
            self.set_mark(Some(self.position));
        }
        self.text_motion(motion, true);
    }

    fn text_motion(&mut self, motion: TextMotion, select: bool) {
        match motion {
            TextMotion::Backspace => {
                if self.mark.is_some() {
                    self.delete_selection();
                    self.update(None, true);
                } else if self.position > 0 {
                    self.layout
                        .document_mut()
                        .delete_text(self.position - 1, self.position);
                    self.set_position(self.position - 1);
                }
            }
            TextMotion::Delete => {
                if self.mark.is_some() {
                    self.delete_selection();
                    self.update(None, true);
                } else if self.position < self.layout.document().len() {
                    self.layout
                        .document_mut()
                        .delete_text(self.position, self.position + 1);
                    self.update(None, true);
                }
            }
            _ => {
                if self.mark.is_some() && !select {
                    self.mark = None;
                    self.layout.set_selection(0, 0);
                }
            }
        }

        match motion {
            TextMotion::Left => self.set_position(self.position.saturating_sub(1)),
            TextMotion::Right => {
                self.set_position((self.position + 1).min(self.layout.document().len()));
            }
            TextMotion::Up => self.set_line(self.line().saturating_sub(1)),
            TextMotion::Down => {
                let line = self.line();
                if line + 1 < self.layout.line_count() {
                    self.set_line(line + 1);
                }
            }
            TextMotion::LineStart => {
                let line = self.line();
                self.set_position(self.layout.position_from_line(line));
            }
            TextMotion::LineEnd => {
                let line = self.line();
                if line + 1 < self.layout.line_count() {
                    // End of this line, just before the wrap/newline.
                    self.position = self.layout.position_on_line(line + 1, 0.0) - 1;
                    self.update(Some(line), true);
                } else {
                    self.set_position(self.layout.document().len());
                }
            }
            TextMotion::FileStart => self.set_position(0),
            TextMotion::FileEnd => self.set_position(self.layout.document().len()),
            TextMotion::NextWord => {
                let from = self.position + 1;
                let target = {
                    let document = self.layout.document();
                    boundary::next_word_start(document.text(), from).unwrap_or(document.len())
                };
                self.set_position(target);
            }
            TextMotion::PreviousWord => {
                let target = boundary::previous_word_start(
                    self.layout.document().text(),
                    self.position,
                )
                .unwrap_or(0);
                self.set_position(target);
            }
            TextMotion::Backspace | TextMotion::Delete => {}
        }

        self.next_attributes.clear();
        self.nudge();
    }

    /// Pans the layout viewport by [`SCROLL_INCREMENT`](Self::SCROLL_INCREMENT)
    /// pixels per scroll notch.
    pub fn on_mouse_scroll(&mut self, scroll_x: f32, scroll_y: f32) {
        let view_x = self.layout.view_x();
        self.layout
            .set_view_x(view_x - scroll_x * Self::SCROLL_INCREMENT);
        let view_y = self.layout.view_y();
        self.layout
            .set_view_y(view_y + scroll_y * Self::SCROLL_INCREMENT);
    }

    /// Handles a mouse press, reconstructing double- and triple-clicks
    /// from press timing: one click moves the caret, two select the word,
    /// three select the paragraph (and reset the count, so a fourth rapid
    /// click starts over as a single click).
    pub fn on_mouse_press(&mut self, x: f32, y: f32) {
        let now = self.scheduler.now();
        if now.saturating_sub(self.click_time) < Self::CLICK_INTERVAL {
            self.click_count += 1;
        } else {
            self.click_count = 1;
        }
        self.click_time = now;
        log::trace!("mouse press, click count {}", self.click_count);

        match self.click_count {
            1 => self.move_to_point(x, y),
            2 => self.select_word(x, y),
            3 => {
                self.select_paragraph(x, y);
                self.click_count = 0;
            }
            _ => {}
        }

        self.nudge();
    }

    /// Handles a mouse drag: anchors the mark at the drag start, then
    /// extends the selection to the dragged-to point.
    pub fn on_mouse_drag(&mut self, x: f32, y: f32) {
        if self.mark.is_none() {
            self.set_mark(Some(self.position));
        }
        self.select_to_point(x, y);
        self.nudge();
    }

    /// The caret resumes blinking when its window becomes active.
    pub fn on_activate(&mut self) {
        self.active = true;
        self.set_visible(self.visible);
    }

    /// The caret is hidden while its window is inactive, regardless of the
    /// `visible` flag.
    pub fn on_deactivate(&mut self) {
        self.active = false;
        self.set_visible(self.visible);
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point2;

    /// Styled text storage over char offsets, one attribute map per char.
    struct FakeDocument {
        text: String,
        styles: Vec<StyleAttrs>,
    }

    impl FakeDocument {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                styles: text.chars().map(|_| StyleAttrs::default()).collect(),
            }
        }
    }

    impl EditableDocument for FakeDocument {
        fn text(&self) -> &str {
            &self.text
        }

        fn insert_text(&mut self, position: usize, text: &str, attrs: &StyleAttrs) {
            let mut chars: Vec<char> = self.text.chars().collect();
            let inserted: Vec<char> = text.chars().collect();
            self.styles.splice(
                position..position,
                inserted.iter().map(|_| attrs.clone()),
            );
            chars.splice(position..position, inserted);
            self.text = chars.into_iter().collect();
        }

        fn delete_text(&mut self, start: usize, end: usize) {
            let mut chars: Vec<char> = self.text.chars().collect();
            chars.drain(start..end);
            self.styles.drain(start..end);
            self.text = chars.into_iter().collect();
        }

        fn get_style(&self, name: &str, position: usize) -> Option<StyleValue> {
            self.styles.get(position)?.get(name).cloned()
        }

        fn get_style_range(&self, name: &str, start: usize, end: usize) -> Option<StyleValue> {
            let mut values = (start..end).map(|i| self.get_style(name, i));
            let first = values.next()?;
            if values.all(|v| v == first) {
                first
            } else {
                Some(StyleValue::Indeterminate)
            }
        }

        fn set_style(&mut self, start: usize, end: usize, attrs: &StyleAttrs) {
            for style in &mut self.styles[start..end] {
                style.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        fn paragraph_start(&self, position: usize) -> usize {
            self.text
                .chars()
                .take(position)
                .collect::<Vec<char>>()
                .iter()
                .rposition(|&c| c == '\n')
                .map(|i| i + 1)
                .unwrap_or(0)
        }

        fn paragraph_end(&self, position: usize) -> usize {
            self.text
                .chars()
                .skip(position)
                .position(|c| c == '\n')
                .map(|i| position + i + 1)
                .unwrap_or(self.len())
        }

        fn vertical_extent(&self, _position: usize) -> (f32, f32) {
            (8.0, -2.0)
        }
    }

    /// Fixed-grid layout: 10 px per char, 10 px per line, baselines going
    /// down in -y.
    struct FakeLayout {
        document: FakeDocument,
        view_x: f32,
        view_y: f32,
        selection: (usize, usize),
        bar: Option<CaretBar>,
        ensured_line: Option<usize>,
        ensured_x: Option<f32>,
    }

    impl FakeLayout {
        fn new(text: &str) -> Self {
            Self {
                document: FakeDocument::new(text),
                view_x: 0.0,
                view_y: 0.0,
                selection: (0, 0),
                bar: None,
                ensured_line: None,
                ensured_x: None,
            }
        }

        fn line_starts(&self) -> Vec<usize> {
            let mut starts = vec![0];
            for (i, c) in self.document.text.chars().enumerate() {
                if c == '\n' {
                    starts.push(i + 1);
                }
            }
            starts
        }

        fn line_len(&self, line: usize) -> usize {
            let starts = self.line_starts();
            let start = starts[line];
            self.document
                .text
                .chars()
                .skip(start)
                .take_while(|&c| c != '\n')
                .count()
        }
    }

    impl EditableLayout for FakeLayout {
        type Document = FakeDocument;

        fn document(&self) -> &FakeDocument {
            &self.document
        }

        fn document_mut(&mut self) -> &mut FakeDocument {
            &mut self.document
        }

        fn point_from_position(
            &self,
            position: usize,
            line: Option<usize>,
        ) -> euclid::default::Point2D<f32> {
            let line = line.unwrap_or_else(|| self.line_from_position(position));
            let start = self.line_starts()[line];
            let col = position.saturating_sub(start);
            point2(col as f32 * 10.0, -(line as f32 * 10.0))
        }

        fn position_on_line(&self, line: usize, x: f32) -> usize {
            let col = if x <= 0.0 {
                0
            } else {
                (x / 10.0).round() as usize
            };
            self.line_starts()[line] + col.min(self.line_len(line))
        }

        fn line_from_position(&self, position: usize) -> usize {
            self.document
                .text
                .chars()
                .take(position)
                .filter(|&c| c == '\n')
                .count()
        }

        fn line_from_point(&self, _x: f32, y: f32) -> usize {
            let line = (-y / 10.0).round().max(0.0) as usize;
            line.min(self.line_count() - 1)
        }

        fn position_from_line(&self, line: usize) -> usize {
            self.line_starts()[line]
        }

        fn line_count(&self) -> usize {
            self.line_starts().len()
        }

        fn set_selection(&mut self, start: usize, end: usize) {
            self.selection = (start, end);
        }

        fn ensure_line_visible(&mut self, line: usize) {
            self.ensured_line = Some(line);
        }

        fn ensure_x_visible(&mut self, x: f32) {
            self.ensured_x = Some(x);
        }

        fn view_x(&self) -> f32 {
            self.view_x
        }

        fn set_view_x(&mut self, x: f32) {
            self.view_x = x;
        }

        fn view_y(&self) -> f32 {
            self.view_y
        }

        fn set_view_y(&mut self, y: f32) {
            self.view_y = y;
        }

        fn update_caret_bar(&mut self, bar: &CaretBar) {
            self.bar = Some(*bar);
        }
    }

    /// Manually-advanced clock; periods are ignored because the tests fire
    /// ticks directly.
    struct FakeScheduler {
        now: Duration,
        next_token: u64,
        active: Vec<TimerToken>,
        schedules: usize,
    }

    impl FakeScheduler {
        fn new() -> Self {
            Self {
                now: Duration::ZERO,
                next_token: 0,
                active: Vec::new(),
                schedules: 0,
            }
        }
    }

    impl Scheduler for FakeScheduler {
        fn schedule_repeating(&mut self, _period: Duration) -> TimerToken {
            let token = TimerToken(self.next_token);
            self.next_token += 1;
            self.active.push(token);
            self.schedules += 1;
            token
        }

        fn cancel(&mut self, token: TimerToken) {
            self.active.retain(|&t| t != token);
        }

        fn now(&self) -> Duration {
            self.now
        }
    }

    fn caret(text: &str) -> Caret<FakeLayout, FakeScheduler> {
        Caret::new(FakeLayout::new(text), FakeScheduler::new())
    }

    fn alpha(caret: &Caret<FakeLayout, FakeScheduler>) -> u8 {
        caret.layout().bar.unwrap().color[3]
    }

    fn bold() -> StyleAttrs {
        let mut attrs = StyleAttrs::default();
        attrs.insert("bold".to_string(), StyleValue::Bool(true));
        attrs
    }

    #[test]
    fn left_at_start_clamps_to_zero() {
        let mut caret = caret("ab");
        caret.on_text_motion(TextMotion::Left);
        assert_eq!(caret.position(), 0);
    }

    #[test]
    fn right_clamps_to_text_length() {
        let mut caret = caret("ab");
        for _ in 0..3 {
            caret.on_text_motion(TextMotion::Right);
        }
        assert_eq!(caret.position(), 2);
    }

    #[test]
    fn select_motion_grows_selection_in_min_max_order() {
        let mut caret = caret("hello world");
        caret.set_position(2);
        for _ in 0..3 {
            caret.on_text_motion_select(TextMotion::Right);
        }
        assert_eq!(caret.mark(), Some(2));
        assert_eq!(caret.position(), 5);
        assert_eq!(caret.layout().selection, (2, 5));

        // Motion past the mark keeps min/max ordering.
        let mut caret = self::caret("hello");
        caret.set_position(3);
        for _ in 0..2 {
            caret.on_text_motion_select(TextMotion::Left);
        }
        assert_eq!(caret.layout().selection, (1, 3));
    }

    #[test]
    fn non_selecting_motion_clears_selection() {
        let mut caret = caret("hello");
        caret.set_position(1);
        caret.on_text_motion_select(TextMotion::Right);
        assert_eq!(caret.layout().selection, (1, 2));

        caret.on_text_motion(TextMotion::Left);
        assert_eq!(caret.mark(), None);
        assert_eq!(caret.layout().selection, (0, 0));
    }

    #[test]
    fn backspace_deletes_selection_and_collapses_to_start() {
        let mut caret = caret("hello world");
        caret.set_mark(Some(5));
        caret.set_position(2);
        caret.on_text_motion(TextMotion::Backspace);
        assert_eq!(caret.layout().document().text(), "he world");
        assert_eq!(caret.position(), 2);
        assert_eq!(caret.mark(), None);
    }

    #[test]
    fn backspace_deletes_char_behind() {
        let mut caret = caret("abc");
        caret.set_position(2);
        caret.on_text_motion(TextMotion::Backspace);
        assert_eq!(caret.layout().document().text(), "ac");
        assert_eq!(caret.position(), 1);

        caret.set_position(0);
        caret.on_text_motion(TextMotion::Backspace);
        assert_eq!(caret.layout().document().text(), "ac");
    }

    #[test]
    fn delete_removes_char_ahead() {
        let mut caret = caret("abc");
        caret.set_position(1);
        caret.on_text_motion(TextMotion::Delete);
        assert_eq!(caret.layout().document().text(), "ac");
        assert_eq!(caret.position(), 1);

        caret.set_position(2);
        caret.on_text_motion(TextMotion::Delete);
        assert_eq!(caret.layout().document().text(), "ac");
    }

    #[test]
    fn typed_text_replaces_selection_and_normalizes_cr() {
        let mut caret = caret("hello");
        caret.set_mark(Some(0));
        caret.set_position(2);
        caret.on_text("X\r");
        assert_eq!(caret.layout().document().text(), "X\nllo");
        assert_eq!(caret.position(), 2);
        assert_eq!(caret.mark(), None);
    }

    #[test]
    fn pending_style_applies_to_next_inserted_text() {
        let mut caret = caret("ab");
        caret.set_style(&bold());
        assert_eq!(caret.get_style("bold"), Some(StyleValue::Bool(true)));

        caret.on_text("x");
        assert_eq!(
            caret.layout().document().get_style("bold", 0),
            Some(StyleValue::Bool(true))
        );
        // Moving the caret clears anything still pending; position 2 is the
        // untouched 'b' of the original text.
        caret.set_style(&bold());
        caret.set_position(2);
        assert_eq!(caret.get_style("bold"), None);
    }

    #[test]
    fn style_over_selection_is_immediate_and_range_query_detects_mixes() {
        let mut caret = caret("abc");
        caret.set_mark(Some(0));
        caret.set_position(1);
        caret.set_style(&bold());
        assert_eq!(
            caret.layout().document().get_style("bold", 0),
            Some(StyleValue::Bool(true))
        );

        caret.set_position(2);
        assert_eq!(
            caret.get_style("bold"),
            Some(StyleValue::Indeterminate)
        );
    }

    #[test]
    fn click_cycle_moves_selects_word_then_paragraph_then_restarts() {
        let mut caret = caret("foo bar\nbaz qux");

        caret.on_mouse_press(10.0, 0.0);
        assert_eq!(caret.position(), 1);
        assert_eq!(caret.layout().selection, (0, 0));

        caret.scheduler_mut().now += Duration::from_millis(100);
        caret.on_mouse_press(10.0, 0.0);
        assert_eq!(caret.layout().selection, (0, 4));

        caret.scheduler_mut().now += Duration::from_millis(100);
        caret.on_mouse_press(10.0, 0.0);
        assert_eq!(caret.layout().selection, (0, 8));

        // The count was zeroed, so a fourth rapid click is single again.
        caret.scheduler_mut().now += Duration::from_millis(100);
        caret.on_mouse_press(10.0, 0.0);
        assert_eq!(caret.position(), 1);
        assert_eq!(caret.layout().selection, (0, 0));
    }

    #[test]
    fn slow_clicks_never_multi_select() {
        let mut caret = caret("foo bar");
        for _ in 0..3 {
            caret.scheduler_mut().now += Duration::from_millis(300);
            caret.on_mouse_press(10.0, 0.0);
            assert_eq!(caret.layout().selection, (0, 0));
            assert_eq!(caret.position(), 1);
        }
    }

    #[test]
    fn vertical_navigation_preserves_ideal_x() {
        let mut caret = caret("abcdef\nab\nabcdef");
        caret.set_position(5);

        caret.on_text_motion(TextMotion::Down);
        // The short middle line clamps to its end...
        assert_eq!(caret.position(), 9);

        caret.on_text_motion(TextMotion::Down);
        // ...but the remembered x is restored on the long line below.
        assert_eq!(caret.position(), 15);
    }

    #[test]
    fn up_at_first_line_stays_there() {
        let mut caret = caret("ab\ncd");
        caret.set_position(4);
        caret.on_text_motion(TextMotion::Up);
        assert_eq!(caret.position(), 1);
        caret.on_text_motion(TextMotion::Up);
        assert_eq!(caret.position(), 1);
    }

    #[test]
    fn horizontal_motion_resets_ideal_x() {
        let mut caret = caret("abcdef\nab\nabcdef");
        caret.set_position(5);
        caret.on_text_motion(TextMotion::Down);
        assert_eq!(caret.position(), 9);

        caret.on_text_motion(TextMotion::Left);
        assert_eq!(caret.position(), 8);
        caret.on_text_motion(TextMotion::Down);
        // Ideal x now reflects the post-move column, not the original 5.
        assert_eq!(caret.position(), 11);
    }

    #[test]
    fn line_end_stops_before_the_newline_on_inner_lines() {
        let mut caret = caret("ab\ncd");
        caret.on_text_motion(TextMotion::LineEnd);
        assert_eq!(caret.position(), 2);

        caret.set_position(4);
        caret.on_text_motion(TextMotion::LineEnd);
        assert_eq!(caret.position(), 5);

        caret.on_text_motion(TextMotion::LineStart);
        assert_eq!(caret.position(), 3);
    }

    #[test]
    fn file_start_and_end_jump_to_bounds() {
        let mut caret = caret("ab\ncd");
        caret.set_position(3);
        caret.on_text_motion(TextMotion::FileStart);
        assert_eq!(caret.position(), 0);
        caret.on_text_motion(TextMotion::FileEnd);
        assert_eq!(caret.position(), 5);
    }

    #[test]
    fn word_motions_jump_between_word_starts() {
        let mut caret = caret("foo bar baz");
        caret.on_text_motion(TextMotion::NextWord);
        assert_eq!(caret.position(), 4);
        caret.on_text_motion(TextMotion::NextWord);
        assert_eq!(caret.position(), 8);
        caret.on_text_motion(TextMotion::NextWord);
        assert_eq!(caret.position(), 11);

        caret.on_text_motion(TextMotion::PreviousWord);
        assert_eq!(caret.position(), 8);
        caret.on_text_motion(TextMotion::PreviousWord);
        assert_eq!(caret.position(), 4);
        caret.on_text_motion(TextMotion::PreviousWord);
        assert_eq!(caret.position(), 0);
    }

    #[test]
    fn blink_toggles_alpha_each_tick() {
        let mut caret = caret("ab");
        // Freshly shown carets are solid.
        assert_eq!(alpha(&caret), 255);
        caret.on_blink_tick();
        assert_eq!(alpha(&caret), 0);
        caret.on_blink_tick();
        assert_eq!(alpha(&caret), 255);
    }

    #[test]
    fn hiding_cancels_the_timer_and_blanks_the_bar() {
        let mut caret = caret("ab");
        assert_eq!(caret.scheduler_mut().active.len(), 1);
        caret.set_visible(false);
        assert_eq!(alpha(&caret), 0);
        assert!(caret.scheduler_mut().active.is_empty());

        caret.set_visible(true);
        assert_eq!(alpha(&caret), 255);
        assert_eq!(caret.scheduler_mut().active.len(), 1);
        assert_eq!(caret.scheduler_mut().schedules, 2);
    }

    #[test]
    fn deactivation_hides_regardless_of_visibility() {
        let mut caret = caret("ab");
        caret.on_deactivate();
        assert_eq!(alpha(&caret), 0);
        assert!(caret.scheduler_mut().active.is_empty());
        assert!(caret.visible());

        caret.on_activate();
        assert_eq!(alpha(&caret), 255);
        assert_eq!(caret.scheduler_mut().active.len(), 1);
    }

    #[test]
    fn interaction_shows_the_caret_solid_immediately() {
        let mut caret = caret("ab");
        caret.on_blink_tick();
        assert_eq!(alpha(&caret), 0);
        caret.on_text_motion(TextMotion::Right);
        assert_eq!(alpha(&caret), 255);
    }

    #[test]
    fn scroll_pans_the_viewport_by_increment() {
        let mut caret = caret("ab");
        caret.on_mouse_scroll(1.0, 2.0);
        assert_eq!(caret.layout().view_x, -16.0);
        assert_eq!(caret.layout().view_y, 32.0);
    }

    #[test]
    fn drag_anchors_the_mark_at_drag_start() {
        let mut caret = caret("foo bar");
        caret.on_mouse_press(30.0, 0.0);
        assert_eq!(caret.position(), 3);

        caret.on_mouse_drag(60.0, 0.0);
        assert_eq!(caret.mark(), Some(3));
        assert_eq!(caret.layout().selection, (3, 6));

        // Dragging back across the anchor keeps min/max ordering.
        caret.on_mouse_drag(10.0, 0.0);
        assert_eq!(caret.layout().selection, (1, 3));
    }

    #[test]
    fn caret_bar_tracks_position_and_scrolls_into_view() {
        let mut caret = caret("ab\ncd");
        caret.set_position(4);
        let bar = caret.layout().bar.unwrap();
        assert_eq!(bar.x, 10.0);
        assert_eq!(bar.top, -2.0);
        assert_eq!(bar.bottom, -12.0);
        assert_eq!(caret.layout().ensured_line, Some(1));
        assert_eq!(caret.layout().ensured_x, Some(10.0));
    }

    #[test]
    fn clearing_the_mark_clears_the_visible_selection() {
        let mut caret = caret("abcd");
        caret.set_mark(Some(1));
        caret.set_position(3);
        assert_eq!(caret.layout().selection, (1, 3));
        caret.set_mark(None);
        assert_eq!(caret.layout().selection, (0, 0));
    }
}
