use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::engine::page::{BufferAllocator, PageBuilder, PageError, PageOutput, PooledBufferAllocator};
use crate::engine::types::Schema;
use crate::shared::config::{CONFIG, Settings};

/// Per-run resources handed to every plugin call.
#[derive(Clone)]
pub struct ExecSession {
    allocator: Arc<dyn BufferAllocator>,
    page_size: usize,
    channel_capacity: usize,
    transaction_time: DateTime<Utc>,
}

impl ExecSession {
    pub fn new(settings: &Settings) -> Self {
        let allocator = PooledBufferAllocator::new(
            settings.page.page_size,
            settings.page.pool_capacity,
            settings.page.max_allocated_bytes,
        );
        Self::with_allocator(
            Arc::new(allocator),
            settings.page.page_size,
            settings.executor.channel_capacity,
        )
    }

    pub fn from_global() -> Self {
        Self::new(&CONFIG)
    }

    pub fn with_allocator(
        allocator: Arc<dyn BufferAllocator>,
        page_size: usize,
        channel_capacity: usize,
    ) -> Self {
        Self {
            allocator,
            page_size,
            channel_capacity: channel_capacity.max(1),
            transaction_time: Utc::now(),
        }
    }

    pub fn with_transaction_time(mut self, transaction_time: DateTime<Utc>) -> Self {
        self.transaction_time = transaction_time;
        self
    }

    pub fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn transaction_time(&self) -> DateTime<Utc> {
        self.transaction_time
    }

    /// Builder over the session's allocator and page size.
    pub fn page_builder<O: PageOutput>(
        &self,
        schema: &Schema,
        output: O,
    ) -> Result<PageBuilder<O>, PageError> {
        PageBuilder::new(Arc::clone(&self.allocator), self.page_size, schema, output)
    }
}

impl fmt::Debug for ExecSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecSession")
            .field("allocator", &self.allocator)
            .field("page_size", &self.page_size)
            .field("channel_capacity", &self.channel_capacity)
            .field("transaction_time", &self.transaction_time)
            .finish()
    }
}
