/// Progress snapshot published by the [`ContentService`](crate::ContentService).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    /// A processing run is active.
    pub processing: bool,
    /// Jobs waiting in the queue (not counting the batch in flight).
    pub queued: usize,
    /// Processing runs started so far.
    pub runs: u64,
    /// Jobs whose results were written.
    pub processed: u64,
    /// Jobs that failed and will be retried on the next staleness check.
    pub failed: u64,
}

impl Status {
    /// Nothing queued and nothing running.
    pub fn is_idle(&self) -> bool {
        !self.processing && self.queued == 0
    }
}
