/// A borrowed text buffer addressed by character offset.
///
/// Spans are measured in characters; the regex engine reports bytes.
/// This table converts between the two without rescanning the text.
pub struct CharIndexed<'t> {
    text: &'t str,
    /// Byte offset of every character, followed by `text.len()`.
    byte_offsets: Vec<usize>,
}

impl<'t> CharIndexed<'t> {
    pub fn new(text: &'t str) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_offsets.push(text.len());
        CharIndexed { text, byte_offsets }
    }

    pub fn as_str(&self) -> &'t str {
        self.text
    }

    /// Number of characters in the text.
    pub fn len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character offset of a byte offset. Offsets inside a multi-byte
    /// character round up to the next character.
    pub fn char_offset(&self, byte: usize) -> usize {
        match self.byte_offsets.binary_search(&byte) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    /// Byte offset of a character offset, clamped to the end of the text.
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        self.byte_offsets
            .get(char_offset)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// The text between two character offsets. Reversed ranges are empty.
    pub fn slice(&self, start: usize, end: usize) -> &'t str {
        if end <= start {
            return "";
        }
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }
}
