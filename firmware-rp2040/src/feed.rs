//! UART report feed: framed raw HID reports from the USB host controller.
//!
//! One report per line, `R<hex bytes>*<checksum>\n`; see
//! [`usb_to_cd32::framing`] for the format. This side only moves bytes —
//! decoding the report is the adapter task's job.

use embassy_rp::uart::{Async, Error as UartError, UartRx};
use heapless::Vec;
use usb_to_cd32::framing::{parse_report_line, FrameError, MAX_LINE_LENGTH};

/// Error type for the report feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum FeedError {
    /// UART I/O error.
    Io,
    /// UART framing error.
    Framing,
    /// Line exceeded the protocol's maximum length.
    BufferOverflow,
    /// Frame did not parse or failed its checksum.
    Frame(FrameError),
}

/// Convert UART errors to [`FeedError`].
///
/// A helper function instead of a `From` impl to avoid orphan rule issues.
#[inline]
fn uart_error_to_feed_error(e: UartError) -> FeedError {
    match e {
        UartError::Framing => FeedError::Framing,
        UartError::Overrun => FeedError::BufferOverflow,
        _ => FeedError::Io,
    }
}

/// Line-oriented reader for the raw report feed.
pub struct UartReportFeed<'d> {
    rx: UartRx<'d, Async>,
    buffer: Vec<u8, MAX_LINE_LENGTH>,
}

impl<'d> UartReportFeed<'d> {
    /// Create a new feed from the given UART receiver.
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: Vec::new(),
        }
    }

    /// Receive the next raw report into `out`, returning its length.
    pub async fn next_report(&mut self, out: &mut [u8]) -> Result<usize, FeedError> {
        self.read_line().await?;
        parse_report_line(&self.buffer, out).map_err(FeedError::Frame)
    }

    /// Read bytes until a newline is found or the buffer is full.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded to prevent cascading parse errors on subsequent reads.
    async fn read_line(&mut self) -> Result<(), FeedError> {
        self.buffer.clear();
        let mut byte = [0u8; 1];

        loop {
            self.rx
                .read(&mut byte)
                .await
                .map_err(uart_error_to_feed_error)?;

            if byte[0] == b'\n' {
                return Ok(());
            }

            if self.buffer.push(byte[0]).is_err() {
                // Buffer overflow - discard rest of line until newline
                loop {
                    self.rx
                        .read(&mut byte)
                        .await
                        .map_err(uart_error_to_feed_error)?;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                return Err(FeedError::BufferOverflow);
            }
        }
    }
}
