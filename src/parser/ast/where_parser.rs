use crate::parser::{ast::{Clause, ComparatorOp, LiteralParser}, ParseError, QueryParser};

/// Parses a flat `and` conjunction. `or` and parenthesised grouping are
/// rejected rather than silently misread.
pub struct WhereParser;

impl WhereParser {
    pub fn parse(parser: &mut QueryParser) -> Result<Vec<Clause>, ParseError> {
        if !parser.comparers.r#where.compare(parser) {
            return ParseError::new("Invalid where", parser.position, parser).err();
        }
        parser.jump(parser.comparers.r#where.length);
        parser.next_non_whitespace();

        if parser.eof() {
            return ParseError::new("Missing where clause", parser.position, parser).err();
        }

        let mut clauses = vec![];
        loop {
            clauses.push(Self::parse_clause(parser)?);
            parser.next_non_whitespace();

            if parser.comparers.and.compare(parser) {
                parser.jump(parser.comparers.and.length);
                parser.next_non_whitespace();
                if parser.eof() {
                    return ParseError::new("Missing clause after 'and'", parser.position, parser).err();
                }
                continue;
            }

            if parser.comparers.or.compare(parser) {
                return ParseError::new("Boolean 'or' is not supported", parser.position, parser).err();
            }

            if parser.check_next_phase() {
                break;
            }

            return ParseError::new("Expected 'and'", parser.position, parser).err();
        }

        Ok(clauses)
    }

    pub fn parse_clause(parser: &mut QueryParser) -> Result<Clause, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if parser.current() == '(' {
            return ParseError::new("Grouping is not supported", pivot, parser).err();
        }

        let Some(field) = parser.read_identifier() else {
            return ParseError::new("Invalid where field", pivot, parser).err();
        };

        parser.next_non_whitespace();
        let op_pivot = parser.position;
        let Some(op) = ComparatorOp::check(parser) else {
            return ParseError::new("Invalid operator", op_pivot, parser).err();
        };

        let value = LiteralParser::parse(parser, op)?;

        Ok(Clause { field, op, value, items: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Clause, ComparatorOp, WhereParser}, Phase, QueryParser};

    fn where_clauses(text: &str) -> (Vec<Clause>, Phase) {
        let mut parser = QueryParser::new(text);
        assert!(parser.check_next_phase());
        let clauses = WhereParser::parse(&mut parser).expect("Failed to parse where");
        (clauses, parser.phase)
    }

    #[test]
    fn test_where_single() {
        let (clauses, phase) = where_clauses("WHERE value > 35");

        assert_eq!(clauses, vec![Clause::new("value", ComparatorOp::Gt, "35")]);
        assert_eq!(phase, Phase::EOF);
    }

    #[test]
    fn test_where_and_keeps_order() {
        let (clauses, phase) = where_clauses(
            "where concept = 'HbA1c' and value>=6.5 AND timestamp < 2024-06-01 limit 5",
        );

        assert_eq!(clauses, vec![
            Clause::new("concept", ComparatorOp::Eq, "HbA1c"),
            Clause::new("value", ComparatorOp::GtEq, "6.5"),
            Clause::new("timestamp", ComparatorOp::Lt, "2024-06-01"),
        ]);
        assert_eq!(phase, Phase::Limit);
    }

    #[test]
    fn test_where_in_list() {
        let (clauses, _) = where_clauses("where resource_type in (observation, condition)");

        assert_eq!(clauses, vec![Clause::new("resource_type", ComparatorOp::In, "observation, condition")]);
    }

    #[test]
    fn test_where_rejects_or() {
        let mut parser = QueryParser::new("where a = 1 or b = 2");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Boolean 'or' is not supported");
    }

    #[test]
    fn test_where_rejects_grouping() {
        let mut parser = QueryParser::new("where (a = 1)");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Grouping is not supported");
        assert_eq!(err.start, 6);
    }

    #[test]
    fn test_where_invalid_operator() {
        let mut parser = QueryParser::new("where a ~ 1");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Invalid operator");
        assert_eq!(err.text, "~");
    }

    #[test]
    fn test_where_dangling_and() {
        let mut parser = QueryParser::new("where a = 'x' and");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Missing clause after 'and'");
    }

    #[test]
    fn test_where_dangling_and_after_bare_value() {
        let mut parser = QueryParser::new("where value = 7 and");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Missing clause after 'and'");
    }

    #[test]
    fn test_where_dangling_or_after_bare_value() {
        let mut parser = QueryParser::new("where value = 7 or");
        parser.check_next_phase();
        let err = WhereParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Boolean 'or' is not supported");
    }
}
