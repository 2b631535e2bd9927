//! Driver for the Phomemo M02 Pro thermal sticker printer.
//!
//! Sends ESC/POS raster images over an already paired serial link
//! (RFCOMM character device) and reads back the printer's status replies.

use std::future::Future;

pub mod driver;
pub mod options;
pub mod protocol;
pub mod transport;

pub use driver::Printer;
pub use options::PrinterOptions;
pub use protocol::{PrinterReport, RasterMode};
pub use sticker_status::{Result, Status, StatusCode};
pub use transport::DeviceTransport;

/// What job code needs from a printer.
///
/// Implemented by [`Printer`]; tests substitute fakes.
pub trait ThermalPrinter: Send + Sync {
    /// Print a packed 1-bit bitmap `width` dots wide.
    fn print_image(&self, bitmap: &[u8], width: u16) -> impl Future<Output = Result<()>> + Send;

    /// Ask the printer how it is doing (currently: battery level).
    fn printer_status(&self) -> impl Future<Output = Result<PrinterReport>> + Send;
}
