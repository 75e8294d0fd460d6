use crate::engine::types::TypeTag;
use crate::test_helpers::factory::Factory;

#[test]
fn builds_indexed_columns() {
    let schema = Factory::schema()
        .with("id", TypeTag::Int64)
        .with_many(2, TypeTag::String)
        .create();

    assert_eq!(schema.column_count(), 3);
    assert_eq!(schema.column(1).name(), "c1");
    assert_eq!(schema.column(2).index(), 2);
    assert_eq!(schema.column_type(2), TypeTag::String);
}
