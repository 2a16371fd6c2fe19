//! Editable multi-line text owned by a shape.
//!
//! A `Text` keeps one cached [`TextLine`] per line (string plus measured
//! width/ascent/descent) and a cursor clamped to the buffer. Every edit
//! goes through a primitive that keeps the caches in step and returns a
//! [`TextChange`] able to replay or undo exactly that edit.

use crate::color::Color;
use crate::data::{AttributeSet, Composite};
use crate::font::{Font, FontMetrics, SIMPLE_METRICS};
use crate::geometry::{Point, Rect};
use crate::handle::ModifierKeys;
use crate::renderer::{Alignment, LineStyle, Renderer};
use std::fmt;

/// The focus cursor is `1/CURSOR_HEIGHT_RATIO` of the line height wide.
pub const CURSOR_HEIGHT_RATIO: f64 = 20.0;

// ─── Lines ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    chars: String,
    width: f64,
    ascent: f64,
    descent: f64,
}

impl TextLine {
    fn new(s: &str, font: &Font, height: f64, metrics: &dyn FontMetrics) -> Self {
        TextLine {
            chars: s.to_string(),
            width: metrics.string_width(s, font, height),
            ascent: metrics.ascent(font, height),
            descent: metrics.descent(font, height),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Length in characters.
    pub fn strlen(&self) -> usize {
        self.chars.chars().count()
    }
}

/// Byte offset of the `pos`-th character, or the end of the string.
fn byte_index(s: &str, pos: usize) -> usize {
    s.char_indices().nth(pos).map_or(s.len(), |(i, _)| i)
}

// ─── Keys ────────────────────────────────────────────────────────────────

/// Keyboard input delivered to focused text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    Backspace,
    Return,
    /// A bare modifier press (shift, control, alt, meta).
    Modifier,
    /// Printable input, possibly several characters from an input method.
    Text(String),
    Other,
}

// ─── Changes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TextEdit {
    InsertChar(char),
    DeleteForward(char),
    DeleteBackward(char),
    SplitRow,
    JoinRow,
    /// Snapshot of the whole buffer before it was cleared.
    DeleteAll(String),
}

/// One reversible text edit. `row`/`pos` locate the edit; `cursor` is
/// where the cursor was before it, restored on revert.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChange {
    pub edit: TextEdit,
    pub row: usize,
    pub pos: usize,
    pub cursor: (usize, usize),
}

impl TextChange {
    pub fn apply(&self, text: &mut Text) {
        match &self.edit {
            TextEdit::InsertChar(c) => {
                text.place_cursor(self.row, self.pos);
                text.insert_char_raw(*c);
            }
            TextEdit::DeleteBackward(_) => {
                text.place_cursor(self.row, self.pos + 1);
                text.delete_backward_raw();
            }
            TextEdit::DeleteForward(_) => {
                text.place_cursor(self.row, self.pos);
                text.delete_forward_raw();
            }
            TextEdit::SplitRow => {
                text.place_cursor(self.row, self.pos);
                text.split_line_raw();
            }
            TextEdit::JoinRow => text.join_lines_raw(self.row),
            TextEdit::DeleteAll(_) => {
                text.set_string("");
                text.place_cursor(0, 0);
            }
        }
    }

    pub fn revert(&self, text: &mut Text) {
        match &self.edit {
            TextEdit::InsertChar(_) => {
                text.place_cursor(self.row, self.pos);
                text.delete_forward_raw();
            }
            TextEdit::DeleteBackward(c) | TextEdit::DeleteForward(c) => {
                text.place_cursor(self.row, self.pos);
                text.insert_char_raw(*c);
            }
            TextEdit::SplitRow => text.join_lines_raw(self.row),
            TextEdit::JoinRow => {
                text.place_cursor(self.row, self.pos);
                text.split_line_raw();
            }
            TextEdit::DeleteAll(s) => text.set_string(s),
        }
        text.place_cursor(self.cursor.0, self.cursor.1);
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Text {
    lines: Vec<TextLine>,
    font: Font,
    height: f64,
    pub position: Point,
    pub color: Color,
    pub alignment: Alignment,
    cursor_row: usize,
    cursor_pos: usize,
    focused: bool,
    ascent: f64,
    descent: f64,
    max_width: f64,
    metrics: &'static dyn FontMetrics,
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Text")
            .field("string", &self.get_string())
            .field("position", &self.position)
            .field("cursor", &(self.cursor_row, self.cursor_pos))
            .finish_non_exhaustive()
    }
}

impl Text {
    #[must_use]
    pub fn new(
        string: &str,
        font: Font,
        height: f64,
        position: Point,
        color: Color,
        alignment: Alignment,
    ) -> Self {
        let mut text = Text {
            lines: Vec::new(),
            font,
            height,
            position,
            color,
            alignment,
            cursor_row: 0,
            cursor_pos: 0,
            focused: false,
            ascent: 0.0,
            descent: 0.0,
            max_width: 0.0,
            metrics: &SIMPLE_METRICS,
        };
        text.set_string(string);
        text
    }

    /// Measure with `metrics` instead of the built-in table.
    #[must_use]
    pub fn with_metrics(mut self, metrics: &'static dyn FontMetrics) -> Self {
        self.metrics = metrics;
        self.remeasure();
        self
    }

    /// Replace the whole buffer, splitting on `\n`. The cursor is
    /// clamped into the new buffer.
    pub fn set_string(&mut self, s: &str) {
        self.lines = s
            .split('\n')
            .map(|l| TextLine::new(l, &self.font, self.height, self.metrics))
            .collect();
        self.clamp_cursor();
        self.calc_width();
        self.calc_ascent_descent();
    }

    /// Lines joined with `\n`.
    pub fn get_string(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map_or("", TextLine::as_str)
    }

    pub fn line_strlen(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, TextLine::strlen)
    }

    pub fn line_width(&self, row: usize) -> f64 {
        self.lines.get(row).map_or(0.0, TextLine::width)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.chars.is_empty())
    }

    pub fn font(&self) -> Font {
        self.font
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.remeasure();
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.remeasure();
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_pos)
    }

    /// Move the cursor, clamping it into the buffer.
    pub fn place_cursor(&mut self, row: usize, pos: usize) {
        self.cursor_row = row;
        self.cursor_pos = pos;
        self.clamp_cursor();
    }

    pub fn set_cursor_at_end(&mut self) {
        self.cursor_row = self.lines.len() - 1;
        self.cursor_pos = self.line_strlen(self.cursor_row);
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_row >= self.lines.len() {
            self.cursor_row = self.lines.len() - 1;
        }
        self.cursor_pos = self.cursor_pos.min(self.line_strlen(self.cursor_row));
    }

    fn remeasure(&mut self) {
        let (font, height, metrics) = (self.font, self.height, self.metrics);
        for line in &mut self.lines {
            *line = TextLine::new(&line.chars, &font, height, metrics);
        }
        self.calc_width();
        self.calc_ascent_descent();
    }

    fn calc_width(&mut self) {
        self.max_width = self.lines.iter().map(TextLine::width).fold(0.0, f64::max);
    }

    fn calc_ascent_descent(&mut self) {
        let n = self.lines.len() as f64;
        self.ascent = self.lines.iter().map(|l| l.ascent).sum::<f64>() / n;
        self.descent = self.lines.iter().map(|l| l.descent).sum::<f64>() / n;
    }

    fn set_line_text(&mut self, row: usize, s: &str) {
        self.lines[row] = TextLine::new(s, &self.font, self.height, self.metrics);
    }

    // ─── Primitives ──────────────────────────────────────────────────────

    fn insert_char_raw(&mut self, c: char) {
        let row = self.cursor_row;
        let mut line = self.lines[row].chars.clone();
        line.insert(byte_index(&line, self.cursor_pos), c);
        self.set_line_text(row, &line);
        self.cursor_pos += 1;
        self.max_width = self.max_width.max(self.line_width(row));
    }

    fn delete_forward_raw(&mut self) {
        let row = self.cursor_row;
        if self.cursor_pos >= self.line_strlen(row) {
            if row + 1 < self.lines.len() {
                self.join_lines_raw(row);
            }
            return;
        }
        let mut line = self.lines[row].chars.clone();
        line.remove(byte_index(&line, self.cursor_pos));
        self.set_line_text(row, &line);
        self.clamp_cursor();
        self.calc_width();
    }

    fn delete_backward_raw(&mut self) {
        let row = self.cursor_row;
        if self.cursor_pos == 0 {
            if row > 0 {
                self.join_lines_raw(row - 1);
            }
            return;
        }
        let mut line = self.lines[row].chars.clone();
        line.remove(byte_index(&line, self.cursor_pos - 1));
        self.set_line_text(row, &line);
        self.cursor_pos -= 1;
        self.clamp_cursor();
        self.calc_width();
    }

    fn split_line_raw(&mut self) {
        let row = self.cursor_row;
        let line = self.lines[row].chars.clone();
        let (before, after) = line.split_at(byte_index(&line, self.cursor_pos));
        self.set_line_text(row, before);
        self.lines
            .insert(row + 1, TextLine::new(after, &self.font, self.height, self.metrics));
        self.cursor_row += 1;
        self.cursor_pos = 0;
        self.calc_width();
    }

    fn join_lines_raw(&mut self, first: usize) {
        if first + 1 >= self.lines.len() {
            return;
        }
        let len1 = self.line_strlen(first);
        let next = self.lines.remove(first + 1);
        let combined = format!("{}{}", self.lines[first].chars, next.chars);
        self.set_line_text(first, &combined);
        self.max_width = self.max_width.max(self.line_width(first));
        self.cursor_row = first;
        self.cursor_pos = len1;
        self.calc_width();
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    fn change(&self, edit: TextEdit, row: usize, pos: usize) -> TextChange {
        TextChange {
            edit,
            row,
            pos,
            cursor: self.cursor(),
        }
    }

    pub fn insert_char(&mut self, c: char) -> TextChange {
        let change = self.change(TextEdit::InsertChar(c), self.cursor_row, self.cursor_pos);
        self.insert_char_raw(c);
        change
    }

    /// Delete the character after the cursor, or join with the next line
    /// at the end of a line. `None` at the very end of the buffer.
    pub fn delete_forward(&mut self) -> Option<TextChange> {
        let (row, pos) = self.cursor();
        let change = if pos >= self.line_strlen(row) {
            if row + 1 >= self.lines.len() {
                return None;
            }
            self.change(TextEdit::JoinRow, row, pos)
        } else {
            let c = self.line(row).chars().nth(pos)?;
            self.change(TextEdit::DeleteForward(c), row, pos)
        };
        self.delete_forward_raw();
        Some(change)
    }

    /// Delete the character before the cursor, or join with the previous
    /// line at the start of a line. `None` at the very start.
    pub fn delete_backward(&mut self) -> Option<TextChange> {
        let (row, pos) = self.cursor();
        let change = if pos == 0 {
            if row == 0 {
                return None;
            }
            self.change(TextEdit::JoinRow, row - 1, self.line_strlen(row - 1))
        } else {
            let c = self.line(row).chars().nth(pos - 1)?;
            self.change(TextEdit::DeleteBackward(c), row, pos - 1)
        };
        self.delete_backward_raw();
        Some(change)
    }

    /// Break the current line at the cursor; the cursor moves to the
    /// start of the new line.
    pub fn split_row(&mut self) -> TextChange {
        let change = self.change(TextEdit::SplitRow, self.cursor_row, self.cursor_pos);
        self.split_line_raw();
        change
    }

    /// Append line `first + 1` to line `first`. Rejected on the last line.
    pub fn join_row(&mut self, first: usize) -> Option<TextChange> {
        if first + 1 >= self.lines.len() {
            return None;
        }
        let change = self.change(TextEdit::JoinRow, first, self.line_strlen(first));
        self.join_lines_raw(first);
        Some(change)
    }

    /// Clear the buffer. `None` when it is already empty.
    pub fn delete_all(&mut self) -> Option<TextChange> {
        if self.is_empty() {
            return None;
        }
        let change = self.change(TextEdit::DeleteAll(self.get_string()), self.cursor_row, self.cursor_pos);
        self.set_string("");
        self.place_cursor(0, 0);
        Some(change)
    }

    fn move_word(&mut self, forward: bool) {
        let chars: Vec<char> = self.line(self.cursor_row).chars().collect();
        let max = chars.len();
        if !forward && self.cursor_pos == 0 {
            if self.cursor_row > 0 {
                self.cursor_row -= 1;
                self.cursor_pos = self.line_strlen(self.cursor_row);
            }
            return;
        }
        if forward && self.cursor_pos >= max {
            if self.cursor_row + 1 < self.lines.len() {
                self.cursor_row += 1;
                self.cursor_pos = 0;
            }
            return;
        }
        let mut pos = self.cursor_pos;
        for want_alnum in [false, true] {
            if forward {
                while pos < max && chars[pos].is_alphanumeric() == want_alnum {
                    pos += 1;
                }
            } else {
                while pos > 0 && chars[pos - 1].is_alphanumeric() == want_alnum {
                    pos -= 1;
                }
            }
        }
        self.cursor_pos = pos;
    }

    /// Handle one key press. Returns the edits made, in order; empty when
    /// the buffer was not modified (cursor movement, modifiers).
    pub fn key_event(&mut self, key: &Key, modifiers: ModifierKeys) -> Vec<TextChange> {
        match key {
            Key::Up => {
                self.cursor_row = self.cursor_row.saturating_sub(1);
                self.clamp_cursor();
            }
            Key::Down => {
                self.cursor_row = (self.cursor_row + 1).min(self.lines.len() - 1);
                self.clamp_cursor();
            }
            Key::Left if modifiers.control => self.move_word(false),
            Key::Left => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            Key::Right if modifiers.control => self.move_word(true),
            Key::Right => {
                self.cursor_pos += 1;
                self.clamp_cursor();
            }
            Key::Home => self.cursor_pos = 0,
            Key::End => self.cursor_pos = self.line_strlen(self.cursor_row),
            Key::Delete => return self.delete_forward().into_iter().collect(),
            Key::Backspace => return self.delete_backward().into_iter().collect(),
            Key::Return => return vec![self.split_row()],
            // a newline inside pasted text splits the row like Return
            Key::Text(s) => {
                return s
                    .chars()
                    .filter(|&c| c != '\r')
                    .map(|c| if c == '\n' { self.split_row() } else { self.insert_char(c) })
                    .collect();
            }
            Key::Modifier | Key::Other => {}
        }
        Vec::new()
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Left edge of a line of `width` at the text anchor.
    fn line_left(&self, width: f64) -> f64 {
        self.position.x + self.alignment.offset(width)
    }

    /// Box around all lines. While focused it also covers the cursor.
    pub fn calc_bounding_box(&mut self) -> Rect {
        self.calc_width();
        self.calc_ascent_descent();
        self.bounding_box()
    }

    pub fn bounding_box(&self) -> Rect {
        let left = self.line_left(self.max_width);
        let top = self.position.y - self.ascent;
        let bottom = top + self.ascent + self.descent + self.height * (self.lines.len() - 1) as f64;
        let mut bb = Rect::new(left, top, left + self.max_width, bottom);
        if self.focused {
            let h = self.ascent + self.descent;
            if self.cursor_pos == 0 {
                bb.left -= h / (CURSOR_HEIGHT_RATIO * 2.0);
            } else {
                bb.right += h / (CURSOR_HEIGHT_RATIO * 2.0);
            }
            bb.top -= h / (CURSOR_HEIGHT_RATIO * 2.0);
            bb.bottom += h / CURSOR_HEIGHT_RATIO;
        }
        bb
    }

    /// Manhattan-style distance from `p` to the nearest line's extent.
    pub fn distance_from(&self, p: Point) -> f64 {
        let n = self.lines.len();
        let top = self.position.y - self.ascent;
        let bottom = self.position.y + self.descent + self.height * (n - 1) as f64;
        let (dy, line) = if p.y <= top {
            (top - p.y, 0)
        } else if p.y >= bottom {
            (p.y - bottom, n - 1)
        } else {
            let line = ((p.y - top) / self.height).floor().max(0.0) as usize;
            (0.0, line.min(n - 1))
        };
        let width = self.line_width(line);
        let left = self.line_left(width);
        let right = left + width;
        let dx = if p.x <= left {
            left - p.x
        } else if p.x >= right {
            p.x - right
        } else {
            0.0
        };
        dx + dy
    }

    /// Put the cursor at the glyph boundary nearest to `p`.
    pub fn set_cursor_at_point(&mut self, p: Point) {
        let top = self.position.y - self.ascent;
        let row = ((p.y - top) / self.height).floor().max(0.0) as usize;
        self.cursor_row = row.min(self.lines.len() - 1);
        let line = self.line(self.cursor_row).to_string();
        let start_x = self.line_left(self.line_width(self.cursor_row));
        let mut best = (f64::MAX, 0);
        for (i, end) in line
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(line.len()))
            .enumerate()
        {
            let w = self.metrics.string_width(&line[..end], &self.font, self.height);
            let dist = (p.x - (start_x + w)).abs();
            if dist < best.0 {
                best = (dist, i);
            } else {
                break;
            }
        }
        self.cursor_pos = best.1;
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_font(&self.font, self.height);
        for (i, line) in self.lines.iter().enumerate() {
            let pos = Point::new(self.position.x, self.position.y + i as f64 * self.height);
            renderer.draw_string(&line.chars, pos, self.alignment, &self.color);
        }

        if renderer.is_interactive() && self.focused {
            let h = self.ascent + self.descent;
            let line = self.line(self.cursor_row);
            let first = renderer.text_width(&line[..byte_index(line, self.cursor_pos)], &self.font, self.height);
            let whole = renderer.text_width(line, &self.font, self.height);
            let x = self.line_left(whole) + first;
            let y = self.position.y - self.ascent + self.cursor_row as f64 * self.height;
            renderer.set_linestyle(LineStyle::Solid, 0.0);
            renderer.set_linewidth(h / CURSOR_HEIGHT_RATIO);
            renderer.draw_line(Point::new(x, y), Point::new(x, y + h), &Color::BLACK);
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save(&self) -> Composite {
        let mut c = Composite::new("text");
        c.add_string("string", &self.get_string());
        c.add_font("font", self.font);
        c.add_real("height", self.height);
        c.add_point("pos", self.position);
        c.add_color("color", self.color);
        c.add_enum("alignment", self.alignment.code());
        c
    }

    pub fn load(c: &Composite) -> Self {
        Text::new(
            c.get_string("string").unwrap_or(""),
            c.get_font("font").unwrap_or(Font::SANS),
            c.get_real("height").unwrap_or(1.0),
            c.get_point("pos").unwrap_or(Point::ZERO),
            c.get_color("color").unwrap_or(Color::BLACK),
            c.get_enum("alignment").map_or(Alignment::Left, Alignment::from_code),
        )
    }
}
