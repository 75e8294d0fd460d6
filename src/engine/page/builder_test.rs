use std::sync::Arc;

use super::{
    BufferAllocator, PAGE_HEADER_SIZE, PageBuilder, PageCollector, PageError, PageLayout,
    PageReader, PooledBufferAllocator, to_records,
};
use crate::engine::plugin::PluginError;
use crate::engine::types::{Schema, Timestamp, TypeTag, Value};

fn pool(buffer_size: usize) -> (PooledBufferAllocator, Arc<dyn BufferAllocator>) {
    let pool = PooledBufferAllocator::new(buffer_size, 8, None);
    let shared: Arc<dyn BufferAllocator> = Arc::new(pool.clone());
    (pool, shared)
}

fn int_schema() -> Schema {
    Schema::builder().add("id", TypeTag::Int64).build()
}

#[test]
fn flushes_exactly_when_next_record_would_not_fit() {
    let schema = int_schema();
    let record = PageLayout::new(&schema).fixed_record_size();
    let per_page = 5;
    let page_size = PAGE_HEADER_SIZE + per_page * record + 4;
    let (_pool, allocator) = pool(page_size);

    let mut collector = PageCollector::new();
    let mut builder = PageBuilder::new(allocator, page_size, &schema, &mut collector).unwrap();
    for i in 0..(per_page as i64 - 1) {
        builder.set_int64(0, i);
        builder.add_record().unwrap();
    }
    assert!(builder.output().pages().is_empty());
    assert_eq!(builder.pending_records(), per_page - 1);

    builder.set_int64(0, 99);
    builder.add_record().unwrap();
    assert_eq!(builder.output().pages().len(), 1);
    assert_eq!(builder.output().pages()[0].record_count(), per_page);
    assert_eq!(builder.pending_records(), 0);

    builder.set_int64(0, 100);
    builder.add_record().unwrap();
    builder.finish().unwrap();
    builder.close().unwrap();

    assert!(collector.is_finished());
    assert!(collector.is_closed());
    let counts: Vec<usize> = collector.pages().iter().map(|p| p.record_count()).collect();
    assert_eq!(counts, vec![per_page, 1]);
    for page in collector.pages() {
        assert!(page.len() <= page_size);
    }
}

#[test]
fn dictionary_restarts_on_every_page() {
    let schema = Schema::builder().add("name", TypeTag::String).build();
    let (_pool, allocator) = pool(4096);

    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 4096, &schema, &mut collector).unwrap();
        for name in ["a", "b", "a"] {
            builder.set_string(0, name);
            builder.add_record().unwrap();
        }
        builder.flush().unwrap();
        for name in ["b", "c"] {
            builder.set_string(0, name);
            builder.add_record().unwrap();
        }
        builder.finish().unwrap();
    }

    let pages = collector.into_pages();
    assert_eq!(pages.len(), 2);

    let mut reader = PageReader::new(&schema);
    let mut first = pages.into_iter();
    reader.set_page(first.next().unwrap()).unwrap();
    assert_eq!(reader.dictionary(), ["a", "b"]);
    reader.set_page(first.next().unwrap()).unwrap();
    assert_eq!(reader.dictionary(), ["b", "c"]);
    assert!(reader.next_record().unwrap());
    assert_eq!(reader.get_string(0), "b");
}

#[test]
fn repeated_string_is_stored_once() {
    let schema = Schema::builder()
        .add("flag", TypeTag::Boolean)
        .add("count", TypeTag::Int64)
        .add("name", TypeTag::String)
        .build();
    let (_pool, allocator) = pool(1024);

    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 1024, &schema, &mut collector).unwrap();
        builder.set_boolean(0, true);
        builder.set_int64(1, 42);
        builder.set_string(2, "foo");
        builder.add_record().unwrap();
        builder.set_null(0);
        builder.set_null(1);
        builder.set_string(2, "foo");
        builder.add_record().unwrap();
        builder.finish().unwrap();
    }

    let pages = collector.into_pages();
    assert_eq!(pages.len(), 1);
    let mut reader = PageReader::new(&schema);
    reader.set_page(pages.into_iter().next().unwrap()).unwrap();
    assert_eq!(reader.dictionary(), ["foo"]);

    assert!(reader.next_record().unwrap());
    assert_eq!(
        reader.record_values(),
        vec![Value::Boolean(true), Value::Int64(42), Value::from("foo")]
    );
    assert!(reader.next_record().unwrap());
    assert!(reader.is_null(0));
    assert!(reader.is_null(1));
    assert!(!reader.is_null(2));
    assert_eq!(reader.get_string(2), "foo");
    assert!(!reader.next_record().unwrap());
}

#[test]
fn null_bit_only_affects_its_column() {
    let mut schema = Schema::builder();
    for i in 0..10 {
        schema = schema.add(format!("c{i}"), TypeTag::Int64);
    }
    let schema = schema.build();
    let (_pool, allocator) = pool(1024);

    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 1024, &schema, &mut collector).unwrap();
        for column in 0..10 {
            builder.set_int64(column, column as i64 * 10);
        }
        builder.set_null(3);
        builder.add_record().unwrap();
        for column in 0..10 {
            builder.set_int64(column, 1);
        }
        builder.add_record().unwrap();
        builder.finish().unwrap();
    }

    let records = to_records(&schema, collector.into_pages()).unwrap();
    for (column, value) in records[0].iter().enumerate() {
        if column == 3 {
            assert_eq!(*value, Value::Null);
        } else {
            assert_eq!(*value, Value::Int64(column as i64 * 10));
        }
    }
    assert!(records[1].iter().all(|v| *v == Value::Int64(1)));
}

#[test]
fn setting_a_value_after_null_clears_the_bit() {
    let schema = int_schema();
    let (_pool, allocator) = pool(256);
    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 256, &schema, &mut collector).unwrap();
        builder.set_null(0);
        builder.set_int64(0, 7);
        builder.add_record().unwrap();
        builder.set_string_or_null(0, None);
        builder.add_record().unwrap();
        builder.finish().unwrap();
    }
    let records = to_records(&schema, collector.into_pages()).unwrap();
    assert_eq!(records, vec![vec![Value::Int64(7)], vec![Value::Null]]);
}

#[test]
fn close_releases_unused_page() {
    let schema = int_schema();
    let (pool, allocator) = pool(128);
    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 128, &schema, &mut collector).unwrap();
        assert_eq!(pool.in_use(), 128);
        builder.close().unwrap();
        builder.close().unwrap();
    }
    assert!(collector.pages().is_empty());
    assert!(collector.is_closed());
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn close_emits_pending_records() {
    let schema = int_schema();
    let (pool, allocator) = pool(128);
    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 128, &schema, &mut collector).unwrap();
        builder.set_int64(0, 1);
        builder.add_record().unwrap();
        builder.close().unwrap();
    }
    assert_eq!(collector.pages().len(), 1);
    assert!(!collector.is_finished());
    assert_eq!(pool.in_use(), 128);
    drop(collector);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn long_string_grows_the_page() {
    let schema = Schema::builder()
        .add("body", TypeTag::String)
        .add("at", TypeTag::Timestamp)
        .build();
    let page_size = PageLayout::new(&schema).min_page_size();
    let (_pool, allocator) = pool(page_size);
    let body = "x".repeat(1000);
    let at = Timestamp::new(1_700_000_000, 5).unwrap();

    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, page_size, &schema, &mut collector).unwrap();
        builder.set_string(0, &body);
        builder.set_timestamp(1, at);
        builder.add_record().unwrap();
        builder.finish().unwrap();
    }

    let pages = collector.into_pages();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].capacity() >= pages[0].len());
    let records = to_records(&schema, pages).unwrap();
    assert_eq!(records, vec![vec![Value::String(body), Value::Timestamp(at)]]);
}

#[test]
fn exhausted_growth_keeps_builder_closable() {
    let schema = Schema::builder().add("body", TypeTag::String).build();
    let pool = PooledBufferAllocator::new(64, 8, Some(64));
    let allocator: Arc<dyn BufferAllocator> = Arc::new(pool.clone());
    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, 64, &schema, &mut collector).unwrap();
        builder.set_string(0, &"x".repeat(200));

        let err = builder.add_record().unwrap_err();
        assert!(
            matches!(
                err,
                PluginError::Page(PageError::Exhausted {
                    requested: 221,
                    in_use: 64,
                    limit: 64
                })
            ),
            "{err:?}"
        );
        assert_eq!(builder.pending_records(), 1);

        let err = builder.close().unwrap_err();
        assert!(matches!(err, PluginError::Page(PageError::Exhausted { .. })), "{err:?}");
        builder.close().unwrap();
    }
    assert!(collector.pages().is_empty());
    assert!(collector.is_closed());
    assert_eq!(pool.in_use(), 0);
}

#[test]
#[should_panic(expected = "holds long values")]
fn setter_of_wrong_type_panics() {
    let schema = int_schema();
    let (_pool, allocator) = pool(128);
    let mut builder =
        PageBuilder::new(allocator, 128, &schema, PageCollector::new()).unwrap();
    builder.set_boolean(0, true);
}
