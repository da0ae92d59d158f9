/// Single-line text composer
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub buffer: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.chars().count();
        Self { buffer, cursor }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn len_chars(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.buffer.insert(index, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let index = self.byte_index(self.cursor);
            self.buffer.remove(index);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len_chars() {
            let index = self.byte_index(self.cursor);
            self.buffer.remove(index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len_chars());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len_chars();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Text before and after the cursor
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.buffer.split_at(self.byte_index(self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = InputState::new();
        for c in "helo".chars() {
            input.insert_char(c);
        }
        input.move_left();
        input.insert_char('l');
        assert_eq!(input.buffer, "hello");
        assert_eq!(input.cursor, 4);

        input.move_end();
        input.backspace();
        assert_eq!(input.buffer, "hell");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputState::with_text("héllo");
        input.move_home();
        input.move_right();
        input.move_right();
        input.backspace();
        assert_eq!(input.buffer, "hllo");
        input.delete();
        assert_eq!(input.buffer, "hlo");
        assert_eq!(input.split_at_cursor(), ("h", "lo"));
    }

    #[test]
    fn test_take_resets() {
        let mut input = InputState::with_text("question");
        assert_eq!(input.take(), "question");
        assert!(input.is_empty());
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = InputState::with_text("ab");
        input.move_right();
        assert_eq!(input.cursor, 2);
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor, 0);
        input.backspace();
        assert_eq!(input.buffer, "ab");
    }
}
