use std::cmp::min;

/// Editable text input. Single-line fields drop newlines; masked fields render as `*`.
#[derive(Debug, Clone)]
pub struct TextField {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    scroll_top: usize,
    multiline: bool,
    masked: bool,
}

impl TextField {
    pub fn single_line() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            scroll_top: 0,
            multiline: false,
            masked: false,
        }
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::single_line()
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// What to draw; masked fields hide every character.
    pub fn display(&self) -> String {
        if !self.masked {
            return self.text();
        }
        self.lines
            .iter()
            .map(|line| "*".repeat(line.chars().count()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.insert_str(text);
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.scroll_top = 0;
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn ensure_cursor_visible(&mut self, view_height: usize) {
        if view_height == 0 {
            self.scroll_top = 0;
            return;
        }

        if self.cursor_row < self.scroll_top {
            self.scroll_top = self.cursor_row;
        } else {
            let bottom = self.scroll_top + view_height - 1;
            if self.cursor_row > bottom {
                self.scroll_top = self.cursor_row + 1 - view_height;
            }
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' => self.insert_newline(),
                ch => self.insert_char(ch),
            }
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let column = self.cursor_col;
        let line = self.current_line_mut();
        let idx = Self::char_to_byte_index(line, column);
        line.insert(idx, ch);
        self.cursor_col += 1;
    }

    pub fn insert_newline(&mut self) {
        if !self.multiline {
            return;
        }
        let column = self.cursor_col;
        let line = self.current_line_mut();
        let idx = Self::char_to_byte_index(line, column);
        let remainder = line.split_off(idx);
        self.lines.insert(self.cursor_row + 1, remainder);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let column = self.cursor_col;
            let line = self.current_line_mut();
            let end = Self::char_to_byte_index(line, column);
            let start = Self::char_to_byte_index(line, column - 1);
            line.drain(start..end);
            self.cursor_col -= 1;
            return;
        }

        if self.cursor_row == 0 {
            return;
        }

        let current_line = self.lines.remove(self.cursor_row);
        self.cursor_row -= 1;
        self.cursor_col = self.line_len(self.cursor_row);
        self.current_line_mut().push_str(&current_line);
    }

    pub fn delete(&mut self) {
        let line_len = self.line_len(self.cursor_row);
        if self.cursor_col < line_len {
            let column = self.cursor_col;
            let line = self.current_line_mut();
            let start = Self::char_to_byte_index(line, column);
            let end = Self::char_to_byte_index(line, column + 1);
            line.drain(start..end);
            return;
        }

        if self.cursor_row + 1 >= self.lines.len() {
            return;
        }

        let next_line = self.lines.remove(self.cursor_row + 1);
        self.current_line_mut().push_str(&next_line);
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
        }
    }

    pub fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor_row);
        if self.cursor_col < line_len {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row == 0 {
            return;
        }
        self.cursor_row -= 1;
        self.cursor_col = min(self.cursor_col, self.line_len(self.cursor_row));
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 >= self.lines.len() {
            return;
        }
        self.cursor_row += 1;
        self.cursor_col = min(self.cursor_col, self.line_len(self.cursor_row));
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_row);
    }

    fn current_line_mut(&mut self) -> &mut String {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        &mut self.lines[self.cursor_row]
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    fn char_to_byte_index(line: &str, column: usize) -> usize {
        line.char_indices()
            .nth(column)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| line.len())
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::single_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_ignores_newlines() {
        let mut field = TextField::single_line();
        field.insert_str("AIza\r\nkey");
        assert_eq!(field.text(), "AIzakey");
        assert_eq!(field.cursor(), (0, 7));
    }

    #[test]
    fn multiline_splits_and_joins_lines() {
        let mut field = TextField::multiline();
        field.insert_str("hello\nworld");
        assert_eq!(field.text(), "hello\nworld");
        assert_eq!(field.cursor(), (1, 5));

        field.move_home();
        field.backspace();
        assert_eq!(field.text(), "helloworld");
        assert_eq!(field.cursor(), (0, 5));

        field.delete();
        assert_eq!(field.text(), "helloorld");
    }

    #[test]
    fn masked_display_hides_characters() {
        let mut field = TextField::single_line().masked();
        field.set_text("sécret");
        assert_eq!(field.text(), "sécret");
        assert_eq!(field.display(), "******");
    }

    #[test]
    fn set_text_replaces_content() {
        let mut field = TextField::multiline();
        field.set_text("one\ntwo");
        field.set_text("three");
        assert_eq!(field.text(), "three");
        assert_eq!(field.cursor(), (0, 5));
    }

    #[test]
    fn cursor_moves_respect_line_lengths() {
        let mut field = TextField::multiline();
        field.set_text("long line\nab");
        field.move_up();
        field.move_end();
        assert_eq!(field.cursor(), (0, 9));
        field.move_down();
        assert_eq!(field.cursor(), (1, 2));
        field.move_right();
        assert_eq!(field.cursor(), (1, 2));
        field.move_home();
        field.move_left();
        assert_eq!(field.cursor(), (0, 9));
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut field = TextField::multiline();
        field.set_text("1\n2\n3\n4\n5");
        field.ensure_cursor_visible(2);
        assert_eq!(field.scroll_top(), 3);
        for _ in 0..4 {
            field.move_up();
        }
        field.ensure_cursor_visible(2);
        assert_eq!(field.scroll_top(), 0);
    }
}
