use crate::engine::types::Value;
use crate::test_helpers::factories::SchemaFactory;
use crate::test_helpers::factory::Factory;

#[test]
fn rows_follow_schema_and_null_pattern() {
    let schema = SchemaFactory::all_types().create();
    let rows = Factory::records()
        .with_count(6)
        .with_nulls_every(3)
        .create(&schema);

    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.len() == 5));
    assert!(rows[2].iter().all(Value::is_null));
    assert!(rows[5].iter().all(Value::is_null));
    assert_eq!(rows[1][1], Value::Int64(10));
    assert_eq!(rows[1][3], Value::from("s1"));
}
