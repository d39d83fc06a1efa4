pub mod query_parser;
pub use query_parser::*;

pub mod ast;
pub use ast::*;

pub mod parse_error;
pub use parse_error::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;

pub mod analyzer;

/// Parses cohort DSL text. Identical text always yields an identical result.
pub fn parse(text: &str) -> Result<ParsedQuery, ParseError> {
    ParsedQuery::try_from(text)
}
