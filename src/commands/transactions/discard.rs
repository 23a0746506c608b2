use tracing::debug;

use crate::commands::transactions::Multi;

impl Multi {
    /// Drops every recorded command without running it. Returns how many were
    /// discarded.
    pub fn discard(&mut self) -> usize {
        let discarded = self.queue.len();
        self.queue.clear();
        debug!(discarded, "transaction discarded");

        discarded
    }
}
