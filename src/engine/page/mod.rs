//! Page-based binary record transport.
//!
//! A page is `[record_count: u32][record]*[dictionary]` where every record is
//! `[record_length: u32][null bitmap][fixed-width slots]` and the dictionary is
//! `[entry_count: u32]([byte_length: u32][utf8])*`. All integers little-endian.

mod bitmap;
mod buffer;
mod builder;
mod errors;
mod layout;
mod output;
mod page;
mod reader;
mod records;

#[cfg(test)]
mod builder_test;

pub use bitmap::NullBitmap;
pub use buffer::{Buffer, BufferAllocator, BufferRecycler, PooledBufferAllocator};
pub use builder::PageBuilder;
pub use errors::PageError;
pub use layout::{
    DICTIONARY_ENTRY_HEADER_SIZE, DICTIONARY_HEADER_SIZE, PAGE_HEADER_SIZE, PageLayout,
    RECORD_LENGTH_SIZE,
};
pub use output::{PageCollector, PageOutput};
pub use page::Page;
pub use reader::PageReader;
pub use records::{build_pages, to_records};
