use crate::engine::types::{NANOS_PER_SECOND, Schema, Timestamp, TypeTag, Value};

use super::{
    DICTIONARY_ENTRY_HEADER_SIZE, DICTIONARY_HEADER_SIZE, NullBitmap, PAGE_HEADER_SIZE, Page,
    PageError, PageLayout, RECORD_LENGTH_SIZE,
};

/// Columnar decoder: a cursor over the records of one page at a time.
///
/// Getters read the current record and are only meaningful for non-null
/// columns; they panic when there is no current record, on an out-of-range
/// column, or on a column of another type.
pub struct PageReader {
    layout: PageLayout,
    page: Option<Page>,
    dictionary: Vec<String>,
    record_count: usize,
    read_count: usize,
    next_position: usize,
    current: Option<usize>,
}

impl PageReader {
    pub fn new(schema: &Schema) -> Self {
        Self {
            layout: PageLayout::new(schema),
            page: None,
            dictionary: Vec::new(),
            record_count: 0,
            read_count: 0,
            next_position: PAGE_HEADER_SIZE,
            current: None,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Binds the reader to `page`, releasing the previous one.
    pub fn set_page(&mut self, page: Page) -> Result<(), PageError> {
        self.close();

        let record_count = page.record_count();
        let min_record = self.layout.fixed_record_size();
        let mut offset = PAGE_HEADER_SIZE;
        for record in 0..record_count {
            let length = page.read_u32(offset)? as usize;
            if length < min_record {
                return Err(PageError::Corrupt(format!(
                    "record {record} is {length} bytes, schema needs {min_record}"
                )));
            }
            // Validates that the whole record lies inside the page.
            page.read_bytes(offset, length)?;
            offset += length;
        }

        self.dictionary = read_dictionary(&page, offset)?;
        self.record_count = record_count;
        self.read_count = 0;
        self.next_position = PAGE_HEADER_SIZE;
        self.page = Some(page);
        Ok(())
    }

    /// Advances to the next record. Returns `false` and releases the page
    /// once every record was visited.
    pub fn next_record(&mut self) -> Result<bool, PageError> {
        let Some(page) = self.page.as_ref() else {
            return Ok(false);
        };
        if self.read_count == self.record_count {
            self.close();
            return Ok(false);
        }

        let base = self.next_position;
        let length = page.read_u32(base)? as usize;
        self.validate_record(page, base)?;

        self.current = Some(base);
        self.next_position = base + length;
        self.read_count += 1;
        Ok(true)
    }

    /// Releases the current page.
    pub fn close(&mut self) {
        self.page = None;
        self.current = None;
        self.dictionary.clear();
        self.record_count = 0;
        self.read_count = 0;
    }

    /// Dictionary of the bound page, in index order.
    pub fn dictionary(&self) -> &[String] {
        &self.dictionary
    }

    pub fn is_null(&self, column: usize) -> bool {
        assert!(
            column < self.layout.column_count(),
            "column index {column} out of range for {} columns",
            self.layout.column_count()
        );
        let (bytes, base) = self.current_record();
        let start = base + RECORD_LENGTH_SIZE;
        NullBitmap::is_null(&bytes[start..start + self.layout.null_bitmap_size()], column)
    }

    pub fn get_boolean(&self, column: usize) -> bool {
        self.slot::<1>(column, TypeTag::Boolean)[0] != 0
    }

    pub fn get_int64(&self, column: usize) -> i64 {
        i64::from_le_bytes(self.slot(column, TypeTag::Int64))
    }

    pub fn get_float64(&self, column: usize) -> f64 {
        f64::from_le_bytes(self.slot(column, TypeTag::Float64))
    }

    pub fn get_string(&self, column: usize) -> &str {
        let index = u32::from_le_bytes(self.slot(column, TypeTag::String)) as usize;
        &self.dictionary[index]
    }

    pub fn get_timestamp(&self, column: usize) -> Timestamp {
        let raw: [u8; 12] = self.slot(column, TypeTag::Timestamp);
        let mut seconds = [0u8; 8];
        let mut nanos = [0u8; 4];
        seconds.copy_from_slice(&raw[..8]);
        nanos.copy_from_slice(&raw[8..]);
        Timestamp::clamped(i64::from_le_bytes(seconds), u32::from_le_bytes(nanos))
    }

    pub fn get_value(&self, column: usize) -> Value {
        self.layout.column_type(column).read_value(self, column)
    }

    /// Values of every column of the current record.
    pub fn record_values(&self) -> Vec<Value> {
        (0..self.layout.column_count())
            .map(|column| self.get_value(column))
            .collect()
    }

    fn current_record(&self) -> (&[u8], usize) {
        match (self.page.as_ref(), self.current) {
            (Some(page), Some(base)) => (page.as_bytes(), base),
            _ => panic!("PageReader has no current record"),
        }
    }

    fn slot<const N: usize>(&self, column: usize, expected: TypeTag) -> [u8; N] {
        let actual = self.layout.column_type(column);
        assert_eq!(
            actual, expected,
            "column {column} holds {actual} values, not {expected}"
        );
        let (bytes, base) = self.current_record();
        let offset = base + self.layout.column_offset(column);
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes[offset..offset + N]);
        out
    }

    fn validate_record(&self, page: &Page, base: usize) -> Result<(), PageError> {
        let bitmap = page.read_bytes(base + RECORD_LENGTH_SIZE, self.layout.null_bitmap_size())?;
        for column in 0..self.layout.column_count() {
            if NullBitmap::is_null(bitmap, column) {
                continue;
            }
            let offset = base + self.layout.column_offset(column);
            match self.layout.column_type(column) {
                TypeTag::String => {
                    let index = page.read_u32(offset)? as usize;
                    if index >= self.dictionary.len() {
                        return Err(PageError::Corrupt(format!(
                            "string index {index} in column {column} outside dictionary of {}",
                            self.dictionary.len()
                        )));
                    }
                }
                TypeTag::Timestamp => {
                    let nanos = page.read_u32(offset + 8)?;
                    if nanos >= NANOS_PER_SECOND {
                        return Err(PageError::Corrupt(format!(
                            "timestamp nanos {nanos} in column {column} out of range"
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn read_dictionary(page: &Page, start: usize) -> Result<Vec<String>, PageError> {
    let count = page.read_u32(start)? as usize;
    let mut offset = start + DICTIONARY_HEADER_SIZE;
    let mut entries = Vec::with_capacity(count.min(page.len()));
    for _ in 0..count {
        let length = page.read_u32(offset)? as usize;
        offset += DICTIONARY_ENTRY_HEADER_SIZE;
        let bytes = page.read_bytes(offset, length)?;
        entries.push(String::from_utf8(bytes.to_vec())?);
        offset += length;
    }
    if offset != page.len() {
        return Err(PageError::Corrupt(format!(
            "{} trailing bytes after dictionary",
            page.len().saturating_sub(offset)
        )));
    }
    Ok(entries)
}
