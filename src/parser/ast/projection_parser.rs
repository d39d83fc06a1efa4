use crate::parser::{ParseError, QueryParser};

pub struct ProjectionParser;

impl ProjectionParser {
    pub fn parse(parser: &mut QueryParser) -> Result<Vec<String>, ParseError> {
        if !parser.comparers.select.compare(parser) {
            return ParseError::new("query must start with select", parser.position, parser).err();
        }
        parser.jump(parser.comparers.select.length);

        let mut fields = vec![];
        while !parser.check_next_phase() {
            let pivot = parser.position;
            let Some(field) = parser.read_identifier() else {
                return ParseError::new("Invalid select field", pivot, parser).err();
            };
            fields.push(field);

            parser.next_non_whitespace();
            if parser.current() == ',' {
                parser.next();
                continue;
            }

            if !parser.check_next_phase() {
                return ParseError::new("Expected ',' between select fields", parser.position, parser).err();
            }
            break;
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::ProjectionParser, Phase, QueryParser};

    #[test]
    fn test_projection_fields_in_order() {
        let mut parser = QueryParser::new("select Patient_Id ,resource_type,  value where");
        let fields = ProjectionParser::parse(&mut parser).expect("Failed to parse projection");

        assert_eq!(fields, vec!["patient_id", "resource_type", "value"]);
        assert_eq!(parser.phase, Phase::Criteria);
    }

    #[test]
    fn test_projection_reaches_eof() {
        let mut parser = QueryParser::new("SELECT a");
        let fields = ProjectionParser::parse(&mut parser).expect("Failed to parse projection");

        assert_eq!(fields, vec!["a"]);
        assert_eq!(parser.phase, Phase::EOF);
    }

    #[test]
    fn test_projection_rejects_wildcard() {
        let mut parser = QueryParser::new("select *");
        let err = ProjectionParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Invalid select field");
        assert_eq!(err.text, "*");
        assert_eq!(err.start, 7);
    }

    #[test]
    fn test_projection_requires_commas() {
        let mut parser = QueryParser::new("select a b");
        let err = ProjectionParser::parse(&mut parser).unwrap_err();

        assert_eq!(err.message, "Expected ',' between select fields");
        assert_eq!(err.start, 9);
    }
}
