use std::sync::Arc;

use crate::engine::exec::ExecSession;
use crate::engine::page::PooledBufferAllocator;

/// Sessions over a small pool so tests cross page boundaries quickly.
pub struct SessionFactory {
    page_size: usize,
    pool_capacity: usize,
    channel_capacity: usize,
    limit: Option<usize>,
}

impl SessionFactory {
    pub fn new() -> Self {
        Self {
            page_size: 256,
            pool_capacity: 16,
            channel_capacity: 2,
            limit: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The session plus a handle on its pool for leak checks.
    pub fn create_with_pool(self) -> (ExecSession, PooledBufferAllocator) {
        let pool = PooledBufferAllocator::new(self.page_size, self.pool_capacity, self.limit);
        let session =
            ExecSession::with_allocator(Arc::new(pool.clone()), self.page_size, self.channel_capacity);
        (session, pool)
    }

    pub fn create(self) -> ExecSession {
        self.create_with_pool().0
    }
}
