use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::engine::plugin::PluginError;
use crate::engine::types::{Schema, Timestamp, TypeError, TypeTag, Value};

use super::{
    BufferAllocator, DICTIONARY_ENTRY_HEADER_SIZE, DICTIONARY_HEADER_SIZE, NullBitmap,
    PAGE_HEADER_SIZE, Page, PageError, PageLayout, PageOutput, RECORD_LENGTH_SIZE,
};

const LOG_TARGET: &str = "engine::page::builder";

/// Columnar encoder writing records straight into pooled pages.
///
/// Set every column of a record (in any order), then call `add_record`.
/// Full pages are emitted to `output`; `finish` or `close` emits the rest.
/// Setters panic on an out-of-range column or a column of another type.
pub struct PageBuilder<O: PageOutput> {
    allocator: Arc<dyn BufferAllocator>,
    page_size: usize,
    layout: PageLayout,
    output: O,
    page: Option<Page>,
    position: usize,
    record_count: usize,
    null_bitmap: Vec<u8>,
    dictionary: IndexSet<String>,
    dictionary_size: usize,
    closed: bool,
}

impl<O: PageOutput> PageBuilder<O> {
    pub fn new(
        allocator: Arc<dyn BufferAllocator>,
        page_size: usize,
        schema: &Schema,
        output: O,
    ) -> Result<Self, PageError> {
        let layout = PageLayout::new(schema);
        let page_size = page_size.max(layout.min_page_size());
        let page = Page::new(allocator.allocate(page_size)?);
        let null_bitmap = vec![0u8; layout.null_bitmap_size()];

        Ok(Self {
            allocator,
            page_size,
            layout,
            output,
            page: Some(page),
            position: PAGE_HEADER_SIZE,
            record_count: 0,
            null_bitmap,
            dictionary: IndexSet::new(),
            dictionary_size: DICTIONARY_HEADER_SIZE,
            closed: false,
        })
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Records buffered in the current, not yet emitted page.
    pub fn pending_records(&self) -> usize {
        self.record_count
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn set_null(&mut self, column: usize) {
        assert!(
            column < self.layout.column_count(),
            "column index {column} out of range for {} columns",
            self.layout.column_count()
        );
        NullBitmap::set_bit(&mut self.null_bitmap, column);
    }

    pub fn set_boolean(&mut self, column: usize, value: bool) {
        let offset = self.slot(column, TypeTag::Boolean);
        self.page_mut().put_u8(offset, u8::from(value));
    }

    pub fn set_int64(&mut self, column: usize, value: i64) {
        let offset = self.slot(column, TypeTag::Int64);
        self.page_mut().put_i64(offset, value);
    }

    pub fn set_float64(&mut self, column: usize, value: f64) {
        let offset = self.slot(column, TypeTag::Float64);
        self.page_mut().put_f64(offset, value);
    }

    pub fn set_timestamp(&mut self, column: usize, value: Timestamp) {
        let offset = self.slot(column, TypeTag::Timestamp);
        let page = self.page_mut();
        page.put_i64(offset, value.seconds());
        page.put_u32(offset + 8, value.nanos());
    }

    pub fn set_string(&mut self, column: usize, value: &str) {
        let offset = self.slot(column, TypeTag::String);
        let index = self.intern(value);
        self.page_mut().put_u32(offset, index);
    }

    /// Tolerates upstream writers that hand over a missing string.
    pub fn set_string_or_null(&mut self, column: usize, value: Option<&str>) {
        match value {
            Some(value) => self.set_string(column, value),
            None => self.set_null(column),
        }
    }

    pub fn set_value(&mut self, column: usize, value: &Value) -> Result<(), TypeError> {
        self.layout.column_type(column).write_value(self, column, value)
    }

    /// Seals the current record and flushes the page when another full
    /// record plus the dictionary would no longer fit.
    pub fn add_record(&mut self) -> Result<(), PluginError> {
        let record_size = self.layout.fixed_record_size();
        let position = self.position;
        let Some(page) = self.page.as_mut() else {
            panic!("PageBuilder used after close");
        };
        page.put_u32(position, record_size as u32);
        page.put_bytes(position + RECORD_LENGTH_SIZE, &self.null_bitmap);
        let capacity = page.capacity();

        self.position += record_size;
        self.record_count += 1;
        self.null_bitmap.fill(0);

        if capacity.saturating_sub(self.position) < record_size + self.dictionary_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Emits the current page if it holds any record and starts a new one.
    pub fn flush(&mut self) -> Result<(), PluginError> {
        if self.record_count == 0 {
            return Ok(());
        }
        let page = self.seal_page()?;
        self.output.add(page)?;
        self.page = Some(Page::new(self.allocator.allocate(self.page_size)?));
        Ok(())
    }

    /// Flushes and tells the output no more pages follow.
    pub fn finish(&mut self) -> Result<(), PluginError> {
        self.flush()?;
        self.output.finish()
    }

    /// Emits pending records, releases the page buffer and closes the output.
    /// Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), PluginError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = if self.record_count > 0 {
            self.seal_page()
                .map_err(PluginError::from)
                .and_then(|page| self.output.add(page))
        } else {
            Ok(())
        };
        self.page = None;
        self.output.close();
        result
    }

    fn page_mut(&mut self) -> &mut Page {
        match self.page.as_mut() {
            Some(page) => page,
            None => panic!("PageBuilder used after close"),
        }
    }

    fn slot(&mut self, column: usize, expected: TypeTag) -> usize {
        let actual = self.layout.column_type(column);
        assert_eq!(
            actual, expected,
            "column {column} holds {actual} values, not {expected}"
        );
        NullBitmap::clear_bit(&mut self.null_bitmap, column);
        self.position + self.layout.column_offset(column)
    }

    fn intern(&mut self, value: &str) -> u32 {
        if let Some(index) = self.dictionary.get_index_of(value) {
            return index as u32;
        }
        self.dictionary_size += DICTIONARY_ENTRY_HEADER_SIZE + value.len();
        let (index, _) = self.dictionary.insert_full(value.to_string());
        index as u32
    }

    /// Writes the header and dictionary, then hands the page out. On error the
    /// page and its pending records stay in place.
    fn seal_page(&mut self) -> Result<Page, PageError> {
        let end = self.position + self.dictionary_size;
        let Some(page) = self.page.as_mut() else {
            return Err(PageError::Closed);
        };
        if end > page.capacity() {
            // Strings interned by the last record may not fit the reserve.
            page.grow(self.allocator.as_ref(), self.position, end)?;
        }

        let mut offset = self.position;
        page.put_u32(offset, self.dictionary.len() as u32);
        offset += DICTIONARY_HEADER_SIZE;
        for entry in &self.dictionary {
            page.put_u32(offset, entry.len() as u32);
            offset += DICTIONARY_ENTRY_HEADER_SIZE;
            page.put_bytes(offset, entry.as_bytes());
            offset += entry.len();
        }
        page.seal(offset, self.record_count);

        debug!(
            target: LOG_TARGET,
            records = self.record_count,
            strings = self.dictionary.len(),
            bytes = offset,
            "Sealed page"
        );

        self.position = PAGE_HEADER_SIZE;
        self.record_count = 0;
        self.dictionary.clear();
        self.dictionary_size = DICTIONARY_HEADER_SIZE;
        self.page.take().ok_or(PageError::Closed)
    }
}
