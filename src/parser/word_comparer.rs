use crate::parser::QueryParser;

/// Case-insensitive keyword matcher anchored at the parser cursor.
///
/// A word only matches when it is followed by one of the configured postfixes
/// (whitespace, an explicit delimiter, ...) or, with [`WordComparer::with_eof`],
/// by the end of the text. This keeps `limit` from matching inside `limited`.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    whitespace_postfix: bool,
    eof: bool,
    delimiters: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        Self {
            length: word.len(),
            word,
            whitespace_postfix: false,
            eof: false,
            delimiters: vec![],
        }
    }

    pub fn reach_eof(&self, parser: &QueryParser) -> bool {
        parser.position + self.length >= parser.length
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        for (offset, expected) in self.word.iter().enumerate() {
            match parser.text_v.get(parser.position + offset) {
                Some(ch) if ch.to_uppercase().eq(std::iter::once(*expected)) => {}
                _ => return false,
            }
        }

        if self.reach_eof(parser) {
            return self.eof;
        }

        if !self.whitespace_postfix && self.delimiters.is_empty() {
            return true;
        }

        let next = parser.peek(self.length);

        if self.whitespace_postfix && Self::is_block_delimiter(next) {
            return true;
        }

        self.delimiters.contains(&next)
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_whitespace_postfix(mut self) -> Self { self.whitespace_postfix = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiters.push(delimiter); self }
}
