use crate::engine::types::{Schema, TypeTag};

use super::NullBitmap;

pub const PAGE_HEADER_SIZE: usize = 4;
pub const RECORD_LENGTH_SIZE: usize = 4;
pub const DICTIONARY_HEADER_SIZE: usize = 4;
pub const DICTIONARY_ENTRY_HEADER_SIZE: usize = 4;

/// Slot offsets of one schema, computed once and shared by encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    types: Vec<TypeTag>,
    column_offsets: Vec<usize>,
    null_bitmap_size: usize,
    record_header_size: usize,
    fixed_record_size: usize,
}

impl PageLayout {
    pub fn new(schema: &Schema) -> Self {
        let types = schema.column_types();
        let null_bitmap_size = NullBitmap::size_for(types.len());
        let record_header_size = RECORD_LENGTH_SIZE + null_bitmap_size;

        let mut column_offsets = Vec::with_capacity(types.len());
        let mut offset = record_header_size;
        for tag in &types {
            column_offsets.push(offset);
            offset += tag.fixed_size();
        }

        Self {
            types,
            column_offsets,
            null_bitmap_size,
            record_header_size,
            fixed_record_size: offset,
        }
    }

    pub fn column_count(&self) -> usize {
        self.types.len()
    }

    pub fn column_type(&self, column: usize) -> TypeTag {
        self.types[column]
    }

    /// Offset of `column`'s slot relative to the start of its record.
    pub fn column_offset(&self, column: usize) -> usize {
        self.column_offsets[column]
    }

    pub fn null_bitmap_size(&self) -> usize {
        self.null_bitmap_size
    }

    pub fn record_header_size(&self) -> usize {
        self.record_header_size
    }

    /// Header plus every slot; the length written into each record.
    pub fn fixed_record_size(&self) -> usize {
        self.fixed_record_size
    }

    /// Smallest page able to hold one record and an empty dictionary.
    pub fn min_page_size(&self) -> usize {
        PAGE_HEADER_SIZE + self.fixed_record_size + DICTIONARY_HEADER_SIZE
    }
}
