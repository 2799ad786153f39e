//! Schema descriptors for extraction targets
//!
//! Callers describe what they want back with explicit descriptors; the
//! builder turns them into the JSON Schema sent as function parameters.
//! Nested records and enums are emitted under `$defs` and referenced by name.

use serde_json::{json, Map, Value};

/// Title given to the synthesized object wrapping a primitive target
pub const SINGLE_FIELD_TITLE: &str = "SingleFieldModel";

/// Semantic type of a single value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Boolean,
    Integer,
    Number,
    String,
    Enum(EnumSchema),
    List(Box<FieldKind>),
    Record(RecordSchema),
}

impl FieldKind {
    #[must_use]
    pub fn list_of(item: FieldKind) -> Self {
        FieldKind::List(Box::new(item))
    }

    /// Short human-readable name for logs
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Number => "number".to_string(),
            FieldKind::String => "string".to_string(),
            FieldKind::Enum(e) => format!("enum {}", e.name),
            FieldKind::List(item) => format!("list of {}", item.label()),
            FieldKind::Record(r) => format!("record {}", r.name),
        }
    }
}

/// Closed set of string values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumSchema {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// One declared field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl FieldSchema {
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: Some(default),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Named collection of typed fields
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Full JSON Schema of this record
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut builder = SchemaBuilder::default();
        let root = builder.record(self);
        builder.finish(root)
    }
}

/// What an extraction should produce
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A single value stored under the template's field name
    Primitive(FieldKind),
    /// A whole record whose fields become the function parameters
    Record(RecordSchema),
}

impl Target {
    /// Function parameter schema for a template whose placeholder is `field`
    #[must_use]
    pub fn parameters(&self, field: &str) -> Value {
        match self {
            Target::Record(record) => record.json_schema(),
            Target::Primitive(kind) => single_field_schema(field, kind),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Target::Record(record) => format!("record {}", record.name),
            Target::Primitive(kind) => kind.label(),
        }
    }
}

/// Object schema whose sole required property is `field` typed as `kind`
#[must_use]
pub fn single_field_schema(field: &str, kind: &FieldKind) -> Value {
    let wrapper = RecordSchema::new(SINGLE_FIELD_TITLE).field(FieldSchema::required(field, kind.clone()));
    wrapper.json_schema()
}

/// "`twitter_handle`" -> "Twitter Handle"
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
struct SchemaBuilder {
    defs: Map<String, Value>,
}

impl SchemaBuilder {
    fn kind(&mut self, kind: &FieldKind) -> Value {
        match kind {
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Integer => json!({ "type": "integer" }),
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Enum(e) => {
                self.defs.insert(
                    e.name.clone(),
                    json!({ "title": e.name, "type": "string", "enum": e.variants }),
                );
                json!({ "$ref": format!("#/$defs/{}", e.name) })
            }
            FieldKind::List(item) => json!({ "type": "array", "items": self.kind(item) }),
            FieldKind::Record(record) => {
                let body = self.record(record);
                self.defs.insert(record.name.clone(), body);
                json!({ "$ref": format!("#/$defs/{}", record.name) })
            }
        }
    }

    fn property(&mut self, field: &FieldSchema) -> Value {
        let mut schema = match self.kind(&field.kind) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        schema.insert("title".to_string(), Value::String(title_case(&field.name)));
        if let Some(description) = &field.description {
            schema.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(default) = &field.default {
            schema.insert("default".to_string(), default.clone());
        }
        Value::Object(schema)
    }

    fn record(&mut self, record: &RecordSchema) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &record.fields {
            properties.insert(field.name.clone(), self.property(field));
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("title".to_string(), Value::String(record.name.clone()));
        if let Some(description) = &record.description {
            schema.insert("description".to_string(), Value::String(description.clone()));
        }
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    fn finish(self, root: Value) -> Value {
        match root {
            Value::Object(mut map) if !self.defs.is_empty() => {
                map.insert("$defs".to_string(), Value::Object(self.defs));
                Value::Object(map)
            }
            other => other,
        }
    }
}
