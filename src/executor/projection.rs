use crate::{
    database::{Fact, FactValue, FieldCatalog},
    executor::Row,
};

pub struct Projection;

impl Projection {
    /// Columns used by exports when neither the request nor the DSL name any.
    pub const DEFAULT_FIELDS: [&'static str; 5] = ["patient_id", "resource_type", "concept", "value", "timestamp"];

    pub fn default_fields() -> Vec<String> {
        Self::DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
    }

    /// Reads each field through the catalog. Fields the catalog does not
    /// know fall back to a raw canonical or code attribute of that name.
    pub fn project(fact: &Fact, fields: &[String], catalog: &FieldCatalog) -> Row {
        let values = fields.iter()
            .map(|field| (field.clone(), Self::read(fact, field, catalog)))
            .collect();
        Row(values)
    }

    pub fn read(fact: &Fact, field: &str, catalog: &FieldCatalog) -> FactValue {
        match catalog.lookup(field) {
            Some(info) => fact.read(&info.location, info.kind),
            None => fact.attribute(field).map(FactValue::from_json).unwrap_or(FactValue::Null),
        }
    }
}
