use crate::parser::{ParseError, QueryParser};

pub struct LimitParser;

impl LimitParser {
    /// `limit 0` is treated as unspecified.
    pub fn parse(parser: &mut QueryParser) -> Result<Option<usize>, ParseError> {
        if !parser.comparers.limit.compare(parser) {
            return ParseError::new("Invalid limit", parser.position, parser).err();
        }
        parser.jump(parser.comparers.limit.length);
        parser.next_non_whitespace();

        let pivot = parser.position;
        while parser.current().is_ascii_digit() {
            parser.next();
        }

        let digits = parser.text_from_pivot(pivot);
        let Ok(limit) = digits.parse::<usize>() else {
            return ParseError::new("Invalid limit", pivot, parser).err();
        };

        if !parser.check_next_phase() {
            return ParseError::new("Unexpected input after limit", parser.position, parser).err();
        }

        Ok(if limit == 0 { None } else { Some(limit) })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::LimitParser, Phase, QueryParser};

    fn limit_parser(text: &str) -> QueryParser {
        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());
        parser
    }

    #[test]
    fn test_limit() {
        let mut parser = limit_parser("LIMIT 10");
        assert_eq!(LimitParser::parse(&mut parser).unwrap(), Some(10));
        assert_eq!(parser.phase, Phase::EOF);
    }

    #[test]
    fn test_limit_zero_is_unspecified() {
        let mut parser = limit_parser("limit 0");
        assert_eq!(LimitParser::parse(&mut parser).unwrap(), None);
    }

    #[test]
    fn test_limit_not_a_number() {
        let mut parser = limit_parser("LIMIT AB");
        let err = LimitParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Invalid limit");
        assert_eq!(err.start, 6);
        assert_eq!(err.text, "A");
    }

    #[test]
    fn test_limit_trailing_input() {
        let mut parser = limit_parser("limit 10 offset 5");
        let err = LimitParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Unexpected input after limit");
        assert_eq!(err.start, 9);
    }
}
