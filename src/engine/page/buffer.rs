use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::ArrayQueue;
use tracing::debug;

use super::PageError;

const LOG_TARGET: &str = "engine::page::buffer";

/// Source of page buffers shared by every partition.
pub trait BufferAllocator: Send + Sync + fmt::Debug {
    /// Returns a pooled or fresh buffer of at least `min_capacity` bytes.
    fn allocate(&self, min_capacity: usize) -> Result<Buffer, PageError>;

    /// Gives a buffer back. Dropping the buffer has the same effect.
    fn release(&self, buffer: Buffer) {
        drop(buffer);
    }
}

/// Receives the bytes of a dropped buffer.
pub trait BufferRecycler: Send + Sync {
    fn recycle(&self, bytes: Vec<u8>);
}

/// Fixed-capacity byte region. Returned to its allocator on drop, so a
/// buffer can only ever be released once.
pub struct Buffer {
    bytes: Vec<u8>,
    recycler: Option<Arc<dyn BufferRecycler>>,
}

impl Buffer {
    pub fn new(bytes: Vec<u8>, recycler: Arc<dyn BufferRecycler>) -> Self {
        Self {
            bytes,
            recycler: Some(recycler),
        }
    }

    /// Wraps bytes that do not belong to any allocator.
    pub fn detached(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            recycler: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.bytes.len())
            .field("pooled", &self.recycler.is_some())
            .finish()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(recycler) = self.recycler.take() {
            recycler.recycle(std::mem::take(&mut self.bytes));
        }
    }
}

struct PoolState {
    buffer_size: usize,
    free: ArrayQueue<Vec<u8>>,
    in_use: AtomicUsize,
    limit: Option<usize>,
}

impl BufferRecycler for PoolState {
    fn recycle(&self, bytes: Vec<u8>) {
        self.in_use.fetch_sub(bytes.len(), Ordering::AcqRel);
        // Oversized buffers are never pooled; a full pool drops the buffer.
        if bytes.len() == self.buffer_size {
            let _ = self.free.push(bytes);
        }
    }
}

/// Pool of `buffer_size` byte buffers backed by a lock-free queue.
/// Requests larger than `buffer_size` get a fresh, unpooled buffer.
#[derive(Clone)]
pub struct PooledBufferAllocator {
    state: Arc<PoolState>,
}

impl PooledBufferAllocator {
    pub fn new(buffer_size: usize, pool_capacity: usize, limit: Option<usize>) -> Self {
        Self {
            state: Arc::new(PoolState {
                buffer_size,
                free: ArrayQueue::new(pool_capacity.max(1)),
                in_use: AtomicUsize::new(0),
                limit,
            }),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.state.buffer_size
    }

    /// Bytes currently checked out.
    pub fn in_use(&self) -> usize {
        self.state.in_use.load(Ordering::Acquire)
    }

    /// Buffers waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.state.free.len()
    }

    fn reserve(&self, size: usize) -> Result<(), PageError> {
        let Some(limit) = self.state.limit else {
            self.state.in_use.fetch_add(size, Ordering::AcqRel);
            return Ok(());
        };
        self.state
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(size).filter(|total| *total <= limit)
            })
            .map(|_| ())
            .map_err(|current| PageError::Exhausted {
                requested: size,
                in_use: current,
                limit,
            })
    }
}

impl fmt::Debug for PooledBufferAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBufferAllocator")
            .field("buffer_size", &self.state.buffer_size)
            .field("pooled", &self.state.free.len())
            .field("in_use", &self.in_use())
            .field("limit", &self.state.limit)
            .finish()
    }
}

impl BufferAllocator for PooledBufferAllocator {
    fn allocate(&self, min_capacity: usize) -> Result<Buffer, PageError> {
        let size = min_capacity.max(self.state.buffer_size);
        self.reserve(size)?;

        let bytes = if size == self.state.buffer_size {
            self.state
                .free
                .pop()
                .unwrap_or_else(|| vec![0u8; size])
        } else {
            debug!(target: LOG_TARGET, requested = min_capacity, "Allocating oversized buffer");
            vec![0u8; size]
        };

        let recycler: Arc<dyn BufferRecycler> = self.state.clone();
        Ok(Buffer::new(bytes, recycler))
    }
}
