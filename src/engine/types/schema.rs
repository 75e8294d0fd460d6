use serde::{Deserialize, Serialize};

use super::{Column, ColumnConfig, ColumnVisitor, TypeError, TypeTag};

/// Ordered list of columns where `columns[i].index() == i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn from_configs(configs: &[ColumnConfig]) -> Self {
        configs
            .iter()
            .fold(Self::builder(), |builder, c| builder.add(&c.name, c.type_tag))
            .build()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Panics when `index` is out of range.
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_type(&self, index: usize) -> TypeTag {
        self.columns[index].type_tag()
    }

    pub fn column_types(&self) -> Vec<TypeTag> {
        self.columns.iter().map(Column::type_tag).collect()
    }

    /// First column with the given name. Names are not required to be unique.
    pub fn lookup_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn to_configs(&self) -> Vec<ColumnConfig> {
        self.columns
            .iter()
            .map(|c| ColumnConfig::new(c.name(), c.type_tag()))
            .collect()
    }

    pub fn visit_columns(&self, visitor: &mut dyn ColumnVisitor) {
        for column in &self.columns {
            column.type_tag().accept(column, visitor);
        }
    }
}

impl TryFrom<Vec<Column>> for Schema {
    type Error = TypeError;

    fn try_from(columns: Vec<Column>) -> Result<Self, Self::Error> {
        if let Some((position, column)) = columns
            .iter()
            .enumerate()
            .find(|(i, c)| c.index() != *i)
        {
            return Err(TypeError::InvalidSchema(format!(
                "column '{}' at position {} has index {}",
                column.name(),
                position,
                column.index()
            )));
        }
        Ok(Self { columns })
    }
}

impl From<Schema> for Vec<Column> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn add(mut self, name: impl Into<String>, type_tag: TypeTag) -> Self {
        let index = self.columns.len();
        self.columns.push(Column::new(index, name, type_tag));
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            columns: self.columns,
        }
    }
}
