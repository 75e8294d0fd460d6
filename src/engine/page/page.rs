use std::fmt;

use super::{Buffer, BufferAllocator, PAGE_HEADER_SIZE, PageError};

/// One self-contained batch of records plus its string dictionary.
///
/// Only `PageBuilder` mutates a page; once handed to a sink it is read-only.
/// The backing buffer goes back to its allocator when the page is dropped.
pub struct Page {
    buffer: Buffer,
    length: usize,
    record_count: usize,
}

impl Page {
    pub(super) fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            length: 0,
            record_count: 0,
        }
    }

    /// Wraps encoded page bytes produced elsewhere.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PageError> {
        if bytes.len() < PAGE_HEADER_SIZE {
            return Err(PageError::Corrupt(format!(
                "page of {} bytes is shorter than its header",
                bytes.len()
            )));
        }
        let length = bytes.len();
        let mut page = Self {
            buffer: Buffer::detached(bytes),
            length,
            record_count: 0,
        };
        page.record_count = page.read_u32(0)? as usize;
        Ok(page)
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_slice()[..self.length]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    pub(super) fn seal(&mut self, length: usize, record_count: usize) {
        self.put_u32(0, record_count as u32);
        self.length = length;
        self.record_count = record_count;
    }

    /// Moves the first `used` bytes into a larger buffer from `allocator`.
    pub(super) fn grow(
        &mut self,
        allocator: &dyn BufferAllocator,
        used: usize,
        min_capacity: usize,
    ) -> Result<(), PageError> {
        let mut bigger = allocator.allocate(min_capacity)?;
        bigger.as_mut_slice()[..used].copy_from_slice(&self.buffer.as_slice()[..used]);
        self.buffer = bigger;
        Ok(())
    }

    // Slot writers. Indexing panics on an out-of-range offset instead of
    // writing past the record.

    pub(super) fn put_u8(&mut self, offset: usize, value: u8) {
        self.buffer.as_mut_slice()[offset] = value;
    }

    pub(super) fn put_u32(&mut self, offset: usize, value: u32) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    pub(super) fn put_i64(&mut self, offset: usize, value: i64) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    pub(super) fn put_f64(&mut self, offset: usize, value: f64) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    pub(super) fn put_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.buffer.as_mut_slice()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    // Checked readers over the encoded prefix.

    pub(super) fn read_bytes(&self, offset: usize, len: usize) -> Result<&[u8], PageError> {
        offset
            .checked_add(len)
            .and_then(|end| self.as_bytes().get(offset..end))
            .ok_or_else(|| {
                PageError::Corrupt(format!(
                    "read of {len} bytes at offset {offset} exceeds page length {}",
                    self.length
                ))
            })
    }

    pub(super) fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], PageError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(offset, N)?);
        Ok(out)
    }

    pub(super) fn read_u32(&self, offset: usize) -> Result<u32, PageError> {
        self.read_array::<4>(offset).map(u32::from_le_bytes)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("record_count", &self.record_count)
            .field("length", &self.length)
            .field("capacity", &self.buffer.capacity())
            .finish()
    }
}
