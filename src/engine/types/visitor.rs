use super::Column;

/// Per-type callbacks used to walk a record without matching on `TypeTag`.
pub trait ColumnVisitor {
    fn boolean_column(&mut self, column: &Column);
    fn int64_column(&mut self, column: &Column);
    fn float64_column(&mut self, column: &Column);
    fn string_column(&mut self, column: &Column);
    fn timestamp_column(&mut self, column: &Column);
}
