use crate::parser::{ast::ComparatorOp, ParseError, QueryParser};

pub struct LiteralParser;

impl LiteralParser {
    pub fn is_quote(ch: char) -> bool {
        ch == '\'' || ch == '"'
    }

    pub fn parse(parser: &mut QueryParser, op: ComparatorOp) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if parser.eof() {
            return ParseError::new("Missing value", pivot, parser).err();
        }

        if op == ComparatorOp::In && parser.current() == '(' {
            return Self::parse_list(parser);
        }

        if Self::is_quote(parser.current()) {
            return Self::parse_quoted(parser);
        }

        Self::parse_bare(parser)
    }

    fn parse_quoted(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;
        let quote = parser.current();
        parser.next();

        while !parser.eof() && parser.current() != quote {
            parser.next();
        }

        if parser.eof() {
            return ParseError::new("Unterminated quoted value", pivot, parser).err();
        }

        let value = parser.text_from_range(pivot + 1, parser.position);
        parser.next();

        Ok(value)
    }

    fn parse_list(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;
        parser.next();

        while !parser.eof() && parser.current() != ')' {
            parser.next();
        }

        if parser.eof() {
            return ParseError::new("Unterminated value list", pivot, parser).err();
        }

        let value = parser.text_from_range(pivot + 1, parser.position).trim().to_string();
        parser.next();

        if value.is_empty() {
            return ParseError::new("Empty value list", pivot, parser).err();
        }

        Ok(value)
    }

    /// Bare values may contain inner spaces; they end at the text end or at
    /// whitespace followed by `and`, `or` or `limit`.
    fn parse_bare(parser: &mut QueryParser) -> Result<String, ParseError> {
        let pivot = parser.position;

        while !parser.eof() {
            if parser.current().is_whitespace() {
                let blank = parser.position;
                parser.next_non_whitespace();
                let boundary = parser.eof()
                    || parser.comparers.and.compare(parser)
                    || parser.comparers.or.compare(parser)
                    || parser.comparers.limit.compare(parser);
                if boundary {
                    parser.position = blank;
                    break;
                }
                continue;
            }
            parser.next();
        }

        let value = parser.text_from_pivot(pivot).trim().to_string();
        if value.is_empty() {
            return ParseError::new("Missing value", pivot, parser).err();
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{ComparatorOp, LiteralParser}, QueryParser};

    fn literal(text: &str, op: ComparatorOp) -> (String, usize) {
        let mut parser = QueryParser::new(text);
        let value = LiteralParser::parse(&mut parser, op).expect("Failed to parse literal");
        (value, parser.position)
    }

    #[test]
    fn test_quoted_keeps_case_and_spaces() {
        let (value, position) = literal("'Blood Glucose' and", ComparatorOp::Eq);
        assert_eq!(value, "Blood Glucose");
        assert_eq!(position, 15);
    }

    #[test]
    fn test_bare_stops_before_keyword() {
        let (value, _) = literal("blood-glucose AND value > 3", ComparatorOp::Eq);
        assert_eq!(value, "blood-glucose");

        let (value, _) = literal("120.5 limit 10", ComparatorOp::Gt);
        assert_eq!(value, "120.5");
    }

    #[test]
    fn test_bare_stops_before_trailing_keyword() {
        let (value, position) = literal("7 and", ComparatorOp::Eq);
        assert_eq!(value, "7");
        assert_eq!(position, 1);

        let (value, _) = literal("7 OR", ComparatorOp::Eq);
        assert_eq!(value, "7");
    }

    #[test]
    fn test_bare_allows_inner_spaces() {
        let (value, _) = literal("2024-01-01 10:30", ComparatorOp::GtEq);
        assert_eq!(value, "2024-01-01 10:30");
    }

    #[test]
    fn test_list_for_in() {
        let (value, _) = literal("( 'a', b ,c ) limit 1", ComparatorOp::In);
        assert_eq!(value, "'a', b ,c");
    }

    #[test]
    fn test_unterminated_quote() {
        let mut parser = QueryParser::new("'abc");
        let err = LiteralParser::parse(&mut parser, ComparatorOp::Eq).unwrap_err();
        assert_eq!(err.message, "Unterminated quoted value");
        assert_eq!(err.start, 0);
    }

    #[test]
    fn test_missing_value() {
        let mut parser = QueryParser::new("   ");
        let err = LiteralParser::parse(&mut parser, ComparatorOp::Eq).unwrap_err();
        assert_eq!(err.message, "Missing value");
    }
}
