use crate::parser::QueryComparers;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Projection = 0,
    Criteria = 1,
    Limit = 2,
    EOF = 3,
}

/// Character cursor over a cohort DSL string.
///
/// Keywords are matched case-insensitively through [`QueryComparers`]; the
/// underlying text is never case-folded, so literal values keep their casing.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub phase: Phase,
    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        if self.position < self.length {
            return self.text_v[self.position];
        }

        '\0'
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v.get(self.position + ahead).copied().unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn next_non_whitespace(&mut self) {
        while self.current().is_whitespace() {
            self.next();
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    pub fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '.'
    }

    /// Reads `[A-Za-z0-9_.]+` at the cursor, lowercased. Returns `None` when
    /// the cursor is not on an identifier character.
    pub fn read_identifier(&mut self) -> Option<String> {
        let pivot = self.position;
        while !self.eof() && Self::is_identifier_char(self.current()) {
            self.next();
        }

        if pivot == self.position {
            return None;
        }

        Some(self.text_from_pivot(pivot).to_lowercase())
    }

    /// Skips whitespace and moves to the next phase keyword when one starts at
    /// the cursor. Returns true when the current phase is over.
    pub fn check_next_phase(&mut self) -> bool {
        self.next_non_whitespace();

        if self.eof() {
            self.phase = Phase::EOF;
            return true;
        }

        if self.phase < Phase::Limit && self.comparers.limit.compare(self) {
            self.phase = Phase::Limit;
            return true;
        }

        if self.phase < Phase::Criteria && self.comparers.r#where.compare(self) {
            self.phase = Phase::Criteria;
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{Phase, QueryParser};

    #[test]
    fn test_read_identifier_lowercases() {
        let mut parser = QueryParser::new("Patient_ID, x");
        assert_eq!(parser.read_identifier().as_deref(), Some("patient_id"));
        assert_eq!(parser.current(), ',');
    }

    #[test]
    fn test_check_next_phase_detects_where_then_limit() {
        let mut parser = QueryParser::new("  WHERE a = 1 LIMIT 3");
        assert!(parser.check_next_phase());
        assert_eq!(parser.phase, Phase::Criteria);

        parser.jump(parser.comparers.r#where.length);
        assert!(!parser.check_next_phase());

        parser.jump(6);
        assert!(parser.check_next_phase());
        assert_eq!(parser.phase, Phase::Limit);
    }

    #[test]
    fn test_jump_never_passes_end() {
        let mut parser = QueryParser::new("abc");
        parser.jump(10);
        assert!(parser.eof());
        assert_eq!(parser.current(), '\0');
    }

    #[test]
    fn test_limit_is_not_matched_inside_identifier() {
        let mut parser = QueryParser::new("limited");
        assert!(!parser.check_next_phase());
        assert_eq!(parser.phase, Phase::Projection);
    }
}
