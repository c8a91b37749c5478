//! Cursor handling for single-buffer text fields.
//!
//! The text itself lives in the chat session; this only tracks where the
//! cursor is, in characters, and edits the buffer it is handed.

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
}

impl Cursor {
    /// Cursor position clamped to the buffer.
    pub fn position(&self, text: &str) -> usize {
        self.pos.min(text.chars().count())
    }

    pub fn insert(&mut self, text: &mut String, c: char) {
        let pos = self.position(text);
        let byte_pos = char_to_byte_index(text, pos);
        text.insert(byte_pos, c);
        self.pos = pos + 1;
    }

    pub fn backspace(&mut self, text: &mut String) {
        let pos = self.position(text);
        if pos > 0 {
            let byte_pos = char_to_byte_index(text, pos - 1);
            text.remove(byte_pos);
            self.pos = pos - 1;
        }
    }

    pub fn delete(&mut self, text: &mut String) {
        let pos = self.position(text);
        if pos < text.chars().count() {
            let byte_pos = char_to_byte_index(text, pos);
            text.remove(byte_pos);
        }
    }

    pub fn left(&mut self, text: &str) {
        self.pos = self.position(text).saturating_sub(1);
    }

    pub fn right(&mut self, text: &str) {
        self.pos = (self.position(text) + 1).min(text.chars().count());
    }

    pub fn home(&mut self) {
        self.pos = 0;
    }

    pub fn end(&mut self, text: &str) {
        self.pos = text.chars().count();
    }
}
