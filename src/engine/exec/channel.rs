use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::page::{Page, PageOutput};
use crate::engine::plugin::PluginError;

const LOG_TARGET: &str = "engine::exec::channel";

/// Unit of traffic between the input and output side of one partition.
#[derive(Debug)]
pub enum PageFrame {
    Page(Page),
    /// The input finished successfully; no more pages follow.
    EndStream,
}

/// Bounded single-producer, single-consumer page handoff.
///
/// Both ends block the calling thread, so they must be driven from blocking
/// tasks or plain threads, never from inside an async context.
pub struct PageChannel;

impl PageChannel {
    pub fn bounded(capacity: usize) -> (ChannelPageOutput, PageChannelReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            ChannelPageOutput {
                sender: Some(tx),
                pages: 0,
            },
            PageChannelReceiver {
                receiver: rx,
                ended: false,
                pages: 0,
            },
        )
    }
}

/// Producer end. `finish` sends the end-of-stream frame; `close` without
/// `finish` makes the consumer fail with `ChannelClosed`.
pub struct ChannelPageOutput {
    sender: Option<mpsc::Sender<PageFrame>>,
    pages: usize,
}

impl ChannelPageOutput {
    pub fn pages_sent(&self) -> usize {
        self.pages
    }

    fn send(&mut self, frame: PageFrame) -> Result<(), PluginError> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(PluginError::ChannelClosed);
        };
        sender
            .blocking_send(frame)
            .map_err(|_| PluginError::ChannelClosed)
    }
}

impl PageOutput for ChannelPageOutput {
    fn add(&mut self, page: Page) -> Result<(), PluginError> {
        let records = page.record_count();
        self.send(PageFrame::Page(page))?;
        self.pages += 1;
        debug!(target: LOG_TARGET, records, pages = self.pages, "Page sent");
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PluginError> {
        self.send(PageFrame::EndStream)
    }

    fn close(&mut self) {
        self.sender = None;
    }
}

/// Consumer end.
pub struct PageChannelReceiver {
    receiver: mpsc::Receiver<PageFrame>,
    ended: bool,
    pages: usize,
}

impl PageChannelReceiver {
    /// Blocks for the next page. `Ok(None)` marks a clean end of stream.
    pub fn recv(&mut self) -> Result<Option<Page>, PluginError> {
        if self.ended {
            return Ok(None);
        }
        match self.receiver.blocking_recv() {
            Some(PageFrame::Page(page)) => {
                self.pages += 1;
                Ok(Some(page))
            }
            Some(PageFrame::EndStream) => {
                self.ended = true;
                debug!(target: LOG_TARGET, pages = self.pages, "End of stream");
                Ok(None)
            }
            None => Err(PluginError::ChannelClosed),
        }
    }

    pub fn pages_received(&self) -> usize {
        self.pages
    }

    /// Tears the channel down; a blocked or later send fails with `ChannelClosed`.
    /// Pages still buffered are dropped and their buffers released.
    pub fn close(&mut self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}
