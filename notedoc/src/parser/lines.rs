/// One source line without its terminator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'s> {
    /// The line text; a trailing `\r` is not included.
    pub text: &'s str,
    pub byte_start: usize,
    /// Character offset of the first character of the line.
    pub char_start: usize,
    pub char_len: usize,
}

impl Line<'_> {
    pub fn byte_end(&self) -> usize {
        self.byte_start + self.text.len()
    }

    pub fn char_end(&self) -> usize {
        self.char_start + self.char_len
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split on `\n`, tracking byte and character offsets. A `\r` before the
/// `\n` still counts towards the offsets of the following line.
pub(crate) fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut byte_start = 0;
    let mut char_start = 0;

    for raw in source.split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let char_len = text.chars().count();
        lines.push(Line {
            text,
            byte_start,
            char_start,
            char_len,
        });
        byte_start += raw.len() + 1;
        char_start += raw.chars().count() + 1;
    }

    lines
}
