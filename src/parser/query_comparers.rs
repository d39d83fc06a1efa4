use crate::parser::WordComparer;

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub r#where: WordComparer,
    pub limit: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub equal: WordComparer,
    pub not_equal: WordComparer,
    pub greater_than: WordComparer,
    pub greater_than_or_equal: WordComparer,
    pub less_than: WordComparer,
    pub less_than_or_equal: WordComparer,
    pub r#in: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT").with_whitespace_postfix().with_eof(),
            r#where: WordComparer::new("WHERE").with_whitespace_postfix().with_eof(),
            limit: WordComparer::new("LIMIT").with_whitespace_postfix().with_eof(),
            and: WordComparer::new("AND").with_whitespace_postfix().with_eof(),
            or: WordComparer::new("OR").with_whitespace_postfix().with_eof(),
            equal: WordComparer::new("="),
            not_equal: WordComparer::new("!="),
            greater_than: WordComparer::new(">"),
            greater_than_or_equal: WordComparer::new(">="),
            less_than: WordComparer::new("<"),
            less_than_or_equal: WordComparer::new("<="),
            r#in: WordComparer::new("IN").with_whitespace_postfix().with_delimiter('('),
        }
    }
}
