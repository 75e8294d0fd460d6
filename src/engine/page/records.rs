use std::sync::Arc;

use crate::engine::plugin::PluginError;
use crate::engine::types::{Schema, Value};

use super::{BufferAllocator, Page, PageBuilder, PageCollector, PageError, PageReader};

/// Encodes rows into pages of at most `page_size` bytes.
pub fn build_pages(
    allocator: Arc<dyn BufferAllocator>,
    page_size: usize,
    schema: &Schema,
    rows: &[Vec<Value>],
) -> Result<Vec<Page>, PluginError> {
    let mut collector = PageCollector::new();
    {
        let mut builder = PageBuilder::new(allocator, page_size, schema, &mut collector)?;
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != schema.column_count() {
                return Err(PluginError::Data(format!(
                    "row {row_index} has {} values, schema has {} columns",
                    row.len(),
                    schema.column_count()
                )));
            }
            for (column, value) in row.iter().enumerate() {
                builder.set_value(column, value)?;
            }
            builder.add_record()?;
        }
        builder.finish()?;
        builder.close()?;
    }
    Ok(collector.into_pages())
}

/// Decodes every record of `pages`, in order.
pub fn to_records(
    schema: &Schema,
    pages: impl IntoIterator<Item = Page>,
) -> Result<Vec<Vec<Value>>, PageError> {
    let mut reader = PageReader::new(schema);
    let mut records = Vec::new();
    for page in pages {
        reader.set_page(page)?;
        while reader.next_record()? {
            records.push(reader.record_values());
        }
    }
    Ok(records)
}
