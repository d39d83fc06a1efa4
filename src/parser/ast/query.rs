// SELECT patient_id, resource_type
// WHERE concept = 'blood-glucose' AND value >= 7
// LIMIT 50

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::{ast::{Clause, LimitParser, ProjectionParser, WhereParser}, ParseError, Phase, QueryParser};

#[derive(Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub select_fields: Vec<String>,
    pub filters: Vec<Clause>,
    pub limit: Option<usize>,
}

impl ParsedQuery {
    pub fn parse(parser: &mut QueryParser) -> Result<Self, ParseError> {
        parser.next_non_whitespace();

        if !parser.comparers.select.compare(parser) {
            return ParseError::new("query must start with select", parser.position, parser).err();
        }

        let mut query = ParsedQuery::default();

        while parser.phase != Phase::EOF {
            match parser.phase {
                Phase::Projection => query.select_fields = ProjectionParser::parse(parser)?,
                Phase::Criteria => query.filters = WhereParser::parse(parser)?,
                Phase::Limit => query.limit = LimitParser::parse(parser)?,
                Phase::EOF => break,
            }
        }

        if query.select_fields.is_empty() {
            return ParseError::new("at least one field must be selected", 0, parser).err();
        }

        Ok(query)
    }
}

impl TryFrom<&str> for ParsedQuery {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(value);
        ParsedQuery::parse(&mut parser)
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters = self.filters.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" and ");
        write!(f, "ParsedQuery(select=[{}], where=[{}], limit={:?})", self.select_fields.join(", "), filters, self.limit)
    }
}

impl fmt::Debug for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Clause, ComparatorOp, ParsedQuery}, parse};

    #[test]
    pub fn test_query() {
        let query = parse("SELECT patient_id, resource_type WHERE concept = 'blood-glucose' LIMIT 50")
            .expect("Failed to parse query");

        assert_eq!(query.select_fields, vec!["patient_id", "resource_type"]);
        assert_eq!(query.filters, vec![Clause::new("concept", ComparatorOp::Eq, "blood-glucose")]);
        assert_eq!(query.limit, Some(50));
    }

    #[test]
    pub fn test_parse_is_deterministic() {
        let text = "select patient_id, value where value > 7 and concept != 'A1c' limit 20";
        assert_eq!(parse(text).unwrap(), parse(text).unwrap());
    }

    #[test]
    pub fn test_requires_select() {
        let err = ParsedQuery::try_from("WHERE concept = 'risk'").unwrap_err();
        assert!(err.to_string().contains("must start with select"));
    }

    #[test]
    pub fn test_requires_fields() {
        let err = parse("select where concept = 'risk'").unwrap_err();
        assert_eq!(err.message, "at least one field must be selected");

        let err = parse("   select   ").unwrap_err();
        assert_eq!(err.message, "at least one field must be selected");
    }

    #[test]
    pub fn test_select_only() {
        let query = parse("select concept").unwrap();

        assert_eq!(query.select_fields, vec!["concept"]);
        assert!(query.filters.is_empty());
        assert_eq!(query.limit, None);
    }

    #[test]
    pub fn test_limit_without_where() {
        let query = parse("select patient_id limit 7").unwrap();
        assert_eq!(query.limit, Some(7));
    }

    #[test]
    pub fn test_literal_case_is_preserved() {
        let query = parse("SELECT Patient_ID WHERE Patient_ID = 'PT-00A'").unwrap();

        assert_eq!(query.select_fields, vec!["patient_id"]);
        assert_eq!(query.filters[0].field, "patient_id");
        assert_eq!(query.filters[0].value, "PT-00A");
    }

    #[test]
    pub fn test_where_after_limit_is_rejected() {
        assert!(parse("select a limit 5 where b = 1").is_err());
    }
}
