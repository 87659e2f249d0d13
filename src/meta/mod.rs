//! Canonical model metadata.
//!
//! A nested record description is flattened into a mapping from dotted
//! field paths to scalar kinds. Sequence fields flatten twice, as `+`
//! (append) and `-` (update last), and map fields contribute a `{}`
//! segment; on lookup those stored segments match any concrete segment.
//!
//! [`get`] and [`set`] apply a dotted path to a dynamically-typed record
//! (a string-keyed JSON tree), interpreting the same `+`/`-` markers.

use std::collections::HashMap;

use serde_json::Value;

/// Stored path segment matching any map key.
pub const ENTITY_MAP: &str = "{}";
/// Stored path segment appending a new element to a sequence.
pub const APPEND_TO_SLICE: &str = "+";
/// Stored path segment updating the last element of a sequence.
pub const UPDATE_LAST_ELEMENT: &str = "-";

/// The scalar kind of a flattened field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Invalid,
    Bool,
    Int,
    Float,
    String,
    Date,
    Duration,
    Map,
    Slice,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Invalid => "Invalid",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Date => "Date",
            Self::Duration => "Duration",
            Self::Map => "Map",
            Self::Slice => "Slice",
        };
        f.write_str(name)
    }
}

/// Description of a record type, flattened by [`Meta::from_schema`].
///
/// Field names are the external serialization names.
#[derive(Debug, Clone)]
pub enum Schema {
    Bool,
    Int,
    Float,
    String,
    Date,
    Duration,
    /// An open, dynamically-keyed field.
    Dynamic,
    Struct(Vec<Field>),
    Map(Box<Schema>),
    Seq(Box<Schema>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: &'static str, schema: Schema) -> Self {
        Self { name, schema }
    }
}

/// The flattened path → kind mapping. Computed once at start, read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    paths: HashMap<String, Kind>,
}

impl Meta {
    pub fn from_schema(schema: &Schema) -> Self {
        let mut meta = Self::default();
        if let Schema::Struct(fields) = schema {
            for field in fields {
                meta.collect(&field.schema, field.name.to_string());
            }
        }
        meta
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, Kind)]) -> Self {
        Self {
            paths: pairs.iter().map(|(p, k)| ((*p).to_string(), *k)).collect(),
        }
    }

    fn collect(&mut self, schema: &Schema, path: String) {
        match schema {
            Schema::Bool => {
                self.paths.insert(path, Kind::Bool);
            }
            Schema::Int => {
                self.paths.insert(path, Kind::Int);
            }
            Schema::Float => {
                self.paths.insert(path, Kind::Float);
            }
            Schema::String => {
                self.paths.insert(path, Kind::String);
            }
            Schema::Date => {
                self.paths.insert(path, Kind::Date);
            }
            Schema::Duration => {
                self.paths.insert(path, Kind::Duration);
            }
            Schema::Dynamic => {
                self.paths.insert(path, Kind::Map);
            }
            Schema::Struct(fields) => {
                for field in fields {
                    self.collect(&field.schema, format!("{path}.{}", field.name));
                }
            }
            Schema::Map(value) => {
                self.collect(value, format!("{path}.{ENTITY_MAP}"));
            }
            Schema::Seq(element) => {
                self.collect(element, format!("{path}.{APPEND_TO_SLICE}"));
                self.collect(element, format!("{path}.{UPDATE_LAST_ELEMENT}"));
                self.paths.insert(path, Kind::Slice);
            }
        }
    }

    /// The kind stored for `path`, matching stored wildcard segments
    /// against any concrete segment. [`Kind::Invalid`] when nothing
    /// matches.
    pub fn kind(&self, path: &str) -> Kind {
        if let Some(kind) = self.paths.get(path) {
            return *kind;
        }
        let parts: Vec<&str> = path.split('.').collect();
        'outer: for (stored, kind) in &self.paths {
            let stored_parts: Vec<&str> = stored.split('.').collect();
            if stored_parts.len() != parts.len() {
                continue;
            }
            for (part, stored_part) in parts.iter().zip(&stored_parts) {
                if part != stored_part
                    && *stored_part != ENTITY_MAP
                    && *stored_part != APPEND_TO_SLICE
                    && *stored_part != UPDATE_LAST_ELEMENT
                {
                    continue 'outer;
                }
            }
            return *kind;
        }
        Kind::Invalid
    }

    /// Iterate over the stored paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A dynamically-typed, string-keyed record.
pub type Entity = serde_json::Map<String, Value>;

/// Read the value at a dotted path.
///
/// Walking stops early when a sequence is reached: the sequence itself is
/// returned. Missing intermediate fields yield `Null`.
pub fn get(entity: &Entity, path: &str) -> Value {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = entity;
    for part in &parts[..parts.len() - 1] {
        match current.get(*part) {
            None | Some(Value::Null) => return Value::Null,
            Some(Value::Array(items)) => return Value::Array(items.clone()),
            Some(Value::Object(map)) => current = map,
            Some(_) => return Value::Null,
        }
    }
    current.get(parts[parts.len() - 1]).cloned().unwrap_or(Value::Null)
}

/// Write a value at a dotted path, creating intermediate records.
///
/// A `+` segment appends a fresh sub-record to the sequence named by the
/// preceding segment and descends into it; `-` descends into the
/// last-appended sub-record (creating the sequence and one element when
/// absent).
pub fn set(entity: &mut Entity, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = entity;
    let mut i = 0;
    while i < parts.len() - 1 {
        let part = parts[i];
        match parts.get(i + 1).copied() {
            Some(APPEND_TO_SLICE) => {
                let slot = current
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                let Value::Array(items) = slot else { return };
                items.push(Value::Object(Entity::new()));
                let Some(Value::Object(map)) = items.last_mut() else {
                    return;
                };
                current = map;
                i += 2;
            }
            Some(UPDATE_LAST_ELEMENT) => {
                let slot = current
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !slot.is_array() {
                    *slot = Value::Array(Vec::new());
                }
                let Value::Array(items) = slot else { return };
                if !matches!(items.last(), Some(Value::Object(_))) {
                    items.push(Value::Object(Entity::new()));
                }
                let Some(Value::Object(map)) = items.last_mut() else {
                    return;
                };
                current = map;
                i += 2;
            }
            _ => {
                let slot = current
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(Entity::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Entity::new());
                }
                let Value::Object(map) = slot else { return };
                current = map;
                i += 1;
            }
        }
    }
    current.insert(parts[parts.len() - 1].to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
        Schema::Struct(vec![
            Field::new("employee_id", Schema::String),
            Field::new("annual_earnings", Schema::Float),
            Field::new("tobacco_user", Schema::Bool),
            Field::new("date_of_hire", Schema::Date),
            Field::new("tenure", Schema::Duration),
            Field::new("custom_fields", Schema::Dynamic),
            Field::new(
                "dependents",
                Schema::Seq(Box::new(Schema::Struct(vec![
                    Field::new("first_name", Schema::String),
                    Field::new("age", Schema::Int),
                ]))),
            ),
            Field::new("codes", Schema::Map(Box::new(Schema::String))),
        ])
    }

    // --- Flattening ---

    #[test]
    fn test_primitive_leaves() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("employee_id"), Kind::String);
        assert_eq!(meta.kind("annual_earnings"), Kind::Float);
        assert_eq!(meta.kind("tobacco_user"), Kind::Bool);
    }

    #[test]
    fn test_timestamp_and_duration_fields() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("date_of_hire"), Kind::Date);
        assert_eq!(meta.kind("tenure"), Kind::Duration);
    }

    #[test]
    fn test_dynamic_field_is_map() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("custom_fields"), Kind::Map);
    }

    #[test]
    fn test_sequence_flattens_three_ways() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("dependents"), Kind::Slice);
        assert_eq!(meta.kind("dependents.+.first_name"), Kind::String);
        assert_eq!(meta.kind("dependents.-.age"), Kind::Int);
    }

    #[test]
    fn test_map_field_contributes_wildcard_segment() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("codes.{}"), Kind::String);
    }

    // --- Lookup ---

    #[test]
    fn test_wildcard_matches_concrete_segment() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("codes.plan_code"), Kind::String);
        assert_eq!(meta.kind("dependents.0.first_name"), Kind::String);
    }

    #[test]
    fn test_unknown_path_is_invalid() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("no_such_field"), Kind::Invalid);
        assert_eq!(meta.kind("dependents.+.no_such"), Kind::Invalid);
    }

    #[test]
    fn test_segment_count_must_match() {
        let meta = Meta::from_schema(&sample_schema());
        assert_eq!(meta.kind("codes.a.b"), Kind::Invalid);
    }

    #[test]
    fn test_stored_paths_round_trip() {
        let meta = Meta::from_schema(&sample_schema());
        let paths: Vec<String> = meta.paths().map(str::to_string).collect();
        for path in paths {
            assert_ne!(meta.kind(&path), Kind::Invalid, "path {path}");
        }
    }

    // --- Entity get/set ---

    #[test]
    fn test_set_and_get_scalar() {
        let mut entity = Entity::new();
        set(&mut entity, "employee_id", json!("e-1"));
        assert_eq!(get(&entity, "employee_id"), json!("e-1"));
    }

    #[test]
    fn test_set_creates_intermediate_records() {
        let mut entity = Entity::new();
        set(&mut entity, "address.city", json!("Toronto"));
        assert_eq!(get(&entity, "address.city"), json!("Toronto"));
    }

    #[test]
    fn test_get_missing_path_is_null() {
        let entity = Entity::new();
        assert_eq!(get(&entity, "a.b.c"), Value::Null);
    }

    #[test]
    fn test_append_adds_new_sub_record() {
        let mut entity = Entity::new();
        set(&mut entity, "dependents.+.first_name", json!("Ada"));
        set(&mut entity, "dependents.+.first_name", json!("Grace"));
        let list = get(&entity, "dependents.x");
        assert_eq!(list, json!([{"first_name": "Ada"}, {"first_name": "Grace"}]));
    }

    #[test]
    fn test_update_last_modifies_appended_record() {
        let mut entity = Entity::new();
        set(&mut entity, "dependents.+.first_name", json!("Ada"));
        set(&mut entity, "dependents.-.age", json!(36));
        let list = get(&entity, "dependents.x");
        assert_eq!(list, json!([{"first_name": "Ada", "age": 36}]));
    }

    #[test]
    fn test_update_last_on_missing_sequence_creates_one() {
        let mut entity = Entity::new();
        set(&mut entity, "benefits.-.status", json!("active"));
        let list = get(&entity, "benefits.x");
        assert_eq!(list, json!([{"status": "active"}]));
    }

    #[test]
    fn test_get_returns_sequence_early() {
        let mut entity = Entity::new();
        set(&mut entity, "dependents.+.first_name", json!("Ada"));
        let Value::Array(items) = get(&entity, "dependents.anything.at_all") else {
            panic!("expected the sequence itself");
        };
        assert_eq!(items.len(), 1);
    }
}
