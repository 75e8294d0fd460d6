use crate::engine::types::{Schema, Timestamp, TypeTag, Value};

/// Deterministic rows for a schema. Row `i` holds values derived from `i`;
/// `with_nulls_every(n)` nulls every column of every n-th row.
pub struct RecordFactory {
    count: usize,
    offset: usize,
    nulls_every: Option<usize>,
}

impl RecordFactory {
    pub fn new() -> Self {
        Self {
            count: 10,
            offset: 0,
            nulls_every: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_nulls_every(mut self, n: usize) -> Self {
        self.nulls_every = Some(n.max(1));
        self
    }

    pub fn value_for(type_tag: TypeTag, i: usize) -> Value {
        let n = i as i64;
        match type_tag {
            TypeTag::Boolean => Value::Boolean(i % 2 == 0),
            TypeTag::Int64 => Value::Int64(n * 10),
            TypeTag::Float64 => Value::Float64(n as f64 + 0.5),
            TypeTag::String => Value::String(format!("s{}", i % 4)),
            TypeTag::Timestamp => Value::Timestamp(Timestamp::from_epoch_millis(n * 1_001)),
        }
    }

    pub fn create(self, schema: &Schema) -> Vec<Vec<Value>> {
        (self.offset..self.offset + self.count)
            .map(|i| {
                let null_row = self.nulls_every.is_some_and(|n| i % n == n - 1);
                schema
                    .columns()
                    .iter()
                    .map(|c| {
                        if null_row {
                            Value::Null
                        } else {
                            Self::value_for(c.type_tag(), i)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
