use crate::engine::page::{PageBuilder, PageLayout, PageOutput, PageReader};

use super::{Timestamp, TypeError, TypeTag, Value};

fn check_column(layout: &PageLayout, column: usize, type_tag: TypeTag) {
    assert!(
        column < layout.column_count(),
        "column index {column} out of range for {} columns",
        layout.column_count()
    );
    let actual = layout.column_type(column);
    assert!(actual == type_tag, "column {column} is {actual}, not {type_tag}");
}

/// Write handle on one column of a builder's current record.
///
/// Created through [`TypeTag::writer`], which checks the column type once.
pub struct ColumnWriter<'a, O: PageOutput> {
    builder: &'a mut PageBuilder<O>,
    column: usize,
    type_tag: TypeTag,
}

impl<'a, O: PageOutput> ColumnWriter<'a, O> {
    pub(super) fn new(builder: &'a mut PageBuilder<O>, column: usize, type_tag: TypeTag) -> Self {
        check_column(builder.layout(), column, type_tag);
        Self {
            builder,
            column,
            type_tag,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn set_null(&mut self) {
        self.builder.set_null(self.column);
    }

    pub fn set_boolean(&mut self, value: bool) {
        self.builder.set_boolean(self.column, value);
    }

    pub fn set_int64(&mut self, value: i64) {
        self.builder.set_int64(self.column, value);
    }

    pub fn set_float64(&mut self, value: f64) {
        self.builder.set_float64(self.column, value);
    }

    pub fn set_string(&mut self, value: &str) {
        self.builder.set_string(self.column, value);
    }

    pub fn set_timestamp(&mut self, value: Timestamp) {
        self.builder.set_timestamp(self.column, value);
    }

    /// Writes a dynamic value; fails when its kind is not the column's.
    pub fn set_value(&mut self, value: &Value) -> Result<(), TypeError> {
        self.type_tag.write_value(self.builder, self.column, value)
    }
}

/// Read handle on one column of a reader's current record.
///
/// Getters are only meaningful when [`ColumnReader::is_null`] is false.
pub struct ColumnReader<'a> {
    reader: &'a PageReader,
    column: usize,
    type_tag: TypeTag,
}

impl<'a> ColumnReader<'a> {
    pub(super) fn new(reader: &'a PageReader, column: usize, type_tag: TypeTag) -> Self {
        check_column(reader.layout(), column, type_tag);
        Self {
            reader,
            column,
            type_tag,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn is_null(&self) -> bool {
        self.reader.is_null(self.column)
    }

    pub fn get_boolean(&self) -> bool {
        self.reader.get_boolean(self.column)
    }

    pub fn get_int64(&self) -> i64 {
        self.reader.get_int64(self.column)
    }

    pub fn get_float64(&self) -> f64 {
        self.reader.get_float64(self.column)
    }

    /// Borrowed from the reader's dictionary, valid until the next page.
    pub fn get_string(&self) -> &'a str {
        self.reader.get_string(self.column)
    }

    pub fn get_timestamp(&self) -> Timestamp {
        self.reader.get_timestamp(self.column)
    }

    pub fn get_value(&self) -> Value {
        self.type_tag.read_value(self.reader, self.column)
    }
}
