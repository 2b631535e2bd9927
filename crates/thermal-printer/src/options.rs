//! Driver tuning knobs.
//!
//! The defaults match the M02 Pro firmware. Long prints can take a while
//! before the printer answers, hence the generous read timeout.

use std::time::Duration;

/// Largest single write handed to the transport.
pub const DEFAULT_MAX_CHUNK: usize = 0x10000;

/// How long a single read waits for the printer.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows of paper fed after every image so the sticker clears the cutter.
pub const DEFAULT_FEED_ROWS: u8 = 3;

/// Configuration options for the printer driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterOptions {
    /// Deadline for each individual read from the printer.
    pub read_timeout: Duration,

    /// Maximum bytes per transport write.
    pub max_chunk: usize,

    /// Line feed rows sent after the raster payload.
    pub feed_rows: u8,

    /// Buffer size for the reply that follows a print.
    pub confirmation_buffer: usize,

    /// Buffer size for the battery/status reply.
    pub status_buffer: usize,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_chunk: DEFAULT_MAX_CHUNK,
            feed_rows: DEFAULT_FEED_ROWS,
            confirmation_buffer: 256,
            status_buffer: 8,
        }
    }
}

impl PrinterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the per-read deadline.
    pub fn with_read_timeout(mut self, val: Duration) -> Self {
        self.read_timeout = val;
        self
    }

    /// Builder: set the maximum write chunk. Zero is raised to 1.
    pub fn with_max_chunk(mut self, val: usize) -> Self {
        self.max_chunk = val.max(1);
        self
    }

    /// Builder: set the post-print line feed.
    pub fn with_feed_rows(mut self, val: u8) -> Self {
        self.feed_rows = val;
        self
    }
}
