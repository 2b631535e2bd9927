//! Printer session: command sequencing over a byte transport.
//!
//! A [`Printer`] owns its transport behind a single async mutex. Each public
//! operation holds the lock for its whole command sequence, so concurrent
//! callers queue instead of interleaving bytes on the wire.

use std::path::Path;

use sticker_status::{Result, ResultExt, Status};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::ThermalPrinter;
use crate::options::PrinterOptions;
use crate::protocol::{self, PrinterReport, RasterMode};
use crate::transport::DeviceTransport;

/// One printer session.
pub struct Printer<T> {
    transport: Mutex<T>,
    options: PrinterOptions,
}

impl Printer<DeviceTransport> {
    /// Open the printer's character device, e.g. `/dev/rfcomm0`.
    pub async fn open(path: impl AsRef<Path>, options: PrinterOptions) -> Result<Self> {
        let transport = DeviceTransport::open(path).await?;
        Ok(Self::new(transport, options))
    }
}

impl<T> Printer<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already open transport.
    pub fn new(transport: T, options: PrinterOptions) -> Self {
        Self {
            transport: Mutex::new(transport),
            options,
        }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }

    /// Print a packed 1-bit bitmap `width` dots wide, then feed paper and
    /// wait for the printer's reply.
    ///
    /// A `Timeout` while waiting for the reply is returned as-is; callers
    /// usually treat it as "printed, printer stayed quiet".
    pub async fn print_image(&self, bitmap: &[u8], width: u16) -> Result<()> {
        let (bytes_per_row, rows) = raster_geometry(bitmap.len(), width)?;

        let mut transport = self.transport.lock().await;
        let transport = &mut *transport;

        self.send_cmd(transport, &protocol::init())
            .await
            .context("Failed to initialize printer")?;
        self.send_cmd(
            transport,
            &protocol::raster_header(RasterMode::Normal, bytes_per_row, rows),
        )
        .await
        .context("Failed to send raster image header")?;
        self.send_cmd(transport, bitmap)
            .await
            .context("Failed to send raster image")?;
        tracing::debug!(bytes = bitmap.len(), bytes_per_row, rows, "Sent raster image");

        self.send_cmd(transport, &protocol::line_feed(self.options.feed_rows))
            .await
            .context("Failed to send line feed")?;

        let mut reply = vec![0u8; self.options.confirmation_buffer];
        let n = self.read_data(transport, &mut reply, 0).await?;
        tracing::info!(reply = %protocol::hex(&reply[..n]), "Print finished");
        Ok(())
    }

    /// Query the battery level.
    pub async fn printer_status(&self) -> Result<PrinterReport> {
        let mut transport = self.transport.lock().await;
        let transport = &mut *transport;

        self.send_cmd(transport, &protocol::battery_query())
            .await
            .context("Failed to query printer status")?;

        let mut reply = vec![0u8; self.options.status_buffer];
        let n = self.read_data(transport, &mut reply, 0).await?;

        let report = PrinterReport::decode(&reply[..n]);
        match &report {
            PrinterReport::Battery { percent } => tracing::info!(percent, "Battery level"),
            PrinterReport::Unknown { raw } => {
                tracing::info!(reply = %protocol::hex(raw), "Unknown printer status")
            }
        }
        Ok(report)
    }

    /// Write `data` in chunks of at most `max_chunk` bytes, then flush.
    ///
    /// Every byte must be accepted; a failed or zero-length write aborts.
    async fn send_cmd(&self, transport: &mut T, data: &[u8]) -> Result<()> {
        let max_chunk = self.options.max_chunk.max(1);
        let mut written = 0;

        while written < data.len() {
            let end = data.len().min(written + max_chunk);
            let n = transport
                .write(&data[written..end])
                .await
                .map_err(|e| Status::internal(format!("Failed to send data: {e}")))?;
            if n == 0 {
                return Err(Status::internal("Failed to send data: transport accepted 0 bytes"));
            }

            tracing::trace!(
                offset = written,
                bytes = n,
                data = %protocol::hex(&data[written..written + n.min(16)]),
                "Wrote chunk"
            );
            written += n;
        }

        transport
            .flush()
            .await
            .map_err(|e| Status::internal(format!("Failed to send data: {e}")))?;
        tracing::debug!(bytes = data.len(), "Sent command");
        Ok(())
    }

    /// Read into `buf` until at least `min` bytes have arrived. `min == 0`
    /// issues exactly one read. Each read gets the full timeout.
    ///
    /// Returns the number of bytes read.
    async fn read_data(&self, transport: &mut T, buf: &mut [u8], min: usize) -> Result<usize> {
        let min = min.min(buf.len());
        let mut total = 0;

        loop {
            let n = match timeout(self.options.read_timeout, transport.read(&mut buf[total..])).await
            {
                Err(_) => return Err(Status::timeout("Timed out on read")),
                Ok(Err(e)) => {
                    return Err(Status::internal(format!(
                        "Failed to read data from printer: {e}"
                    )));
                }
                Ok(Ok(n)) => n,
            };
            tracing::debug!(bytes = n, data = %protocol::hex(&buf[total..total + n]), "Read reply");

            if n == 0 && total < min {
                return Err(Status::internal(format!(
                    "Printer closed the connection after {total} of {min} bytes"
                )));
            }
            total += n;
            if total >= min {
                return Ok(total);
            }
        }
    }
}

impl<T> ThermalPrinter for Printer<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn print_image(&self, bitmap: &[u8], width: u16) -> Result<()> {
        Printer::print_image(self, bitmap, width).await
    }

    async fn printer_status(&self) -> Result<PrinterReport> {
        Printer::printer_status(self).await
    }
}

/// Bytes per row and row count for a bitmap `width` dots wide.
fn raster_geometry(len: usize, width: u16) -> Result<(u16, u16)> {
    if width == 0 || width % 8 != 0 {
        return Err(Status::invalid_argument(format!(
            "Print width must be a non-zero multiple of 8, got {width}"
        )));
    }
    let bytes_per_row = width / 8;
    if len == 0 || len % usize::from(bytes_per_row) != 0 {
        return Err(Status::invalid_argument(format!(
            "Bitmap of {len} bytes is not a whole number of {bytes_per_row}-byte rows"
        )));
    }
    let rows = u16::try_from(len / usize::from(bytes_per_row)).map_err(|_| {
        Status::invalid_argument(format!(
            "Bitmap has {} rows, more than the printer accepts",
            len / usize::from(bytes_per_row)
        ))
    })?;
    Ok((bytes_per_row, rows))
}
