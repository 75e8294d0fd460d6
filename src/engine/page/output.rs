use crate::engine::plugin::PluginError;

use super::Page;

/// Sink for finished pages.
pub trait PageOutput: Send {
    fn add(&mut self, page: Page) -> Result<(), PluginError>;

    /// No more pages follow.
    fn finish(&mut self) -> Result<(), PluginError>;

    fn close(&mut self);
}

impl<T: PageOutput + ?Sized> PageOutput for &mut T {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        (**self).add(page)
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        (**self).finish()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<T: PageOutput + ?Sized> PageOutput for Box<T> {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        (**self).add(page)
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        (**self).finish()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Keeps every page it receives, in order.
#[derive(Debug, Default)]
pub struct PageCollector {
    pages: Vec<Page>,
    finished: bool,
    closed: bool,
}

impl PageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PageOutput for PageCollector {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        self.pages.push(page);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        self.finished = true;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
