use crate::engine::types::{Schema, TypeTag};

/// Builds schemas for tests; `new()` starts empty, `all_types()` has one
/// column per type.
pub struct SchemaFactory {
    columns: Vec<(String, TypeTag)>,
}

impl SchemaFactory {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn all_types() -> Self {
        Self::new()
            .with("flag", TypeTag::Boolean)
            .with("count", TypeTag::Int64)
            .with("ratio", TypeTag::Float64)
            .with("name", TypeTag::String)
            .with("at", TypeTag::Timestamp)
    }

    pub fn with(mut self, name: &str, type_tag: TypeTag) -> Self {
        self.columns.push((name.to_string(), type_tag));
        self
    }

    /// Adds `count` columns `c0..` of one type.
    pub fn with_many(mut self, count: usize, type_tag: TypeTag) -> Self {
        let start = self.columns.len();
        for i in start..start + count {
            self.columns.push((format!("c{i}"), type_tag));
        }
        self
    }

    pub fn create(self) -> Schema {
        self.columns
            .into_iter()
            .fold(Schema::builder(), |builder, (name, tag)| builder.add(name, tag))
            .build()
    }
}
