//! Character device transport (e.g. `/dev/rfcomm0`).
//!
//! The node is opened non-blocking and registered with the reactor, so a
//! read cancelled by a timeout leaves nothing running behind it.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use sticker_status::{Result, Status};
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Bidirectional byte stream over an opened device node.
#[derive(Debug)]
pub struct DeviceTransport {
    inner: AsyncFd<File>,
}

impl DeviceTransport {
    /// Open `path` read/write.
    ///
    /// A missing path is `NotFound`. Any other open failure (permissions,
    /// device busy, a node the reactor cannot poll such as a regular file)
    /// is `InvalidArgument`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(path)
            .map_err(|e| open_error(path, e))?;
        let inner = AsyncFd::new(file).map_err(|e| open_error(path, e))?;

        tracing::info!(path = %path.display(), "Opened printer device");
        Ok(Self { inner })
    }
}

fn open_error(path: &Path, err: io::Error) -> Status {
    let message = format!("Failed to open printer device {}: {err}", path.display());
    match err.kind() {
        io::ErrorKind::NotFound => Status::not_found(message),
        _ => Status::invalid_argument(message),
    }
}

impl AsyncRead for DeviceTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            let mut guard = ready!(self.inner.poll_read_ready(cx))?;
            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| inner.get_ref().read(unfilled)) {
                Ok(Ok(len)) => {
                    buf.advance(len);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(err)) => return Poll::Ready(Err(err)),
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsyncWrite for DeviceTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.inner.poll_write_ready(cx))?;
            match guard.try_io(|inner| inner.get_ref().write(buf)) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    // Writes go straight to the fd; there is no user-space buffer.
    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
