use serde::{Deserialize, Serialize};

use super::TypeTag;

/// Positioned, typed column of a schema. Running stages address columns by
/// `index` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    index: usize,
    name: String,
    #[serde(rename = "type")]
    type_tag: TypeTag,
}

impl Column {
    pub fn new(index: usize, name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            index,
            name: name.into(),
            type_tag,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }
}

/// User-facing column declaration, `{name, type}`, without a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
}

impl ColumnConfig {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
        }
    }
}
