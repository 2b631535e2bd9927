//! Spool file naming.
//!
//! Every incoming sticker gets a fresh `file-<n>` name. Names are claimed
//! with an exclusive create, so files kept from an earlier failed job, or
//! written by another process sharing the spool directory, are skipped
//! rather than overwritten.
//!
//! WebM payloads keep a `.webm` extension because their container cannot be
//! sniffed reliably without it. The image decoders cannot read WebM, so such
//! a sticker is spooled but then fails to prepare with `InternalError`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use sticker_status::{Result, Status};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Offset of the DocType string in a typical WebM EBML header.
const WEBM_MARKER_OFFSET: usize = 0x18;
const WEBM_MARKER: &[u8] = b"webm";

pub const SAVE_FAILED_MESSAGE: &str = "I couldn't save the image to print it!";

/// Hands out unique spool file names.
#[derive(Debug, Default)]
pub struct FileNamer {
    counter: Mutex<u64>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next name for `payload`.
    pub fn next_name(&self, payload: &[u8]) -> String {
        let n = {
            let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
            let n = *counter;
            *counter += 1;
            n
        };

        if is_webm(payload) {
            format!("file-{n}.webm")
        } else {
            format!("file-{n}")
        }
    }

    /// Write `payload` into `dir` under a name nobody holds yet and return
    /// its path. Existing files are never touched.
    pub async fn save(&self, dir: &Path, payload: &[u8]) -> Result<PathBuf> {
        let save_error = |path: &Path, e: std::io::Error| {
            Status::internal(format!("Failed to write {}: {e}", path.display()))
                .with_user_message(SAVE_FAILED_MESSAGE)
        };

        loop {
            let path = dir.join(self.next_name(payload));
            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "Spool name taken, trying the next one");
                    continue;
                }
                Err(e) => return Err(save_error(&path, e)),
            };

            file.write_all(payload)
                .await
                .map_err(|e| save_error(&path, e))?;
            file.flush().await.map_err(|e| save_error(&path, e))?;

            tracing::debug!(path = %path.display(), bytes = payload.len(), "Saved sticker");
            return Ok(path);
        }
    }
}

pub fn is_webm(payload: &[u8]) -> bool {
    payload.get(WEBM_MARKER_OFFSET..WEBM_MARKER_OFFSET + WEBM_MARKER.len()) == Some(WEBM_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sticker_status::StatusCode;

    fn webm_header() -> Vec<u8> {
        let mut data = vec![0u8; 0x40];
        data[0..4].copy_from_slice(&[0x1a, 0x45, 0xdf, 0xa3]);
        data[0x18..0x1c].copy_from_slice(b"webm");
        data
    }

    #[test]
    fn test_names_increment_from_zero() {
        let namer = FileNamer::new();
        assert_eq!(namer.next_name(b"png"), "file-0");
        assert_eq!(namer.next_name(b"png"), "file-1");
        assert_eq!(namer.next_name(b"png"), "file-2");
    }

    #[test]
    fn test_webm_gets_extension() {
        let namer = FileNamer::new();
        assert_eq!(namer.next_name(&webm_header()), "file-0.webm");
        assert_eq!(namer.next_name(&[0u8; 0x40]), "file-1");
    }

    #[test]
    fn test_short_payload_is_not_webm() {
        assert!(!is_webm(b""));
        assert!(!is_webm(&webm_header()[..0x1b]));
        assert!(is_webm(&webm_header()[..0x1c]));
    }

    #[test]
    fn test_names_are_unique_across_threads() {
        let namer = std::sync::Arc::new(FileNamer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let namer = std::sync::Arc::clone(&namer);
                std::thread::spawn(move || (0..50).map(|_| namer.next_name(b"")).collect::<Vec<_>>())
            })
            .collect();

        let mut names: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 400);
    }

    #[tokio::test]
    async fn test_save_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let namer = FileNamer::new();

        let path = namer.save(dir.path(), b"sticker bytes").await.unwrap();
        assert_eq!(path, dir.path().join("file-0"));
        assert_eq!(std::fs::read(&path).unwrap(), b"sticker bytes");
    }

    #[tokio::test]
    async fn test_save_skips_files_left_by_earlier_jobs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file-0"), b"kept from a failed job").unwrap();
        std::fs::write(dir.path().join("file-1"), b"another one").unwrap();

        let namer = FileNamer::new();
        let path = namer.save(dir.path(), b"new sticker").await.unwrap();

        assert_eq!(path, dir.path().join("file-2"));
        assert_eq!(std::fs::read(&path).unwrap(), b"new sticker");
        assert_eq!(
            std::fs::read(dir.path().join("file-0")).unwrap(),
            b"kept from a failed job"
        );
        assert_eq!(std::fs::read(dir.path().join("file-1")).unwrap(), b"another one");
    }

    #[tokio::test]
    async fn test_two_namers_sharing_a_directory_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileNamer::new();
        let second = FileNamer::new();

        let a = first.save(dir.path(), b"first run").await.unwrap();
        let b = second.save(dir.path(), b"second run").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read(&a).unwrap(), b"first run");
        assert_eq!(std::fs::read(&b).unwrap(), b"second run");
    }

    #[tokio::test]
    async fn test_save_failure_has_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let namer = FileNamer::new();

        let err = namer
            .save(&dir.path().join("missing"), b"data")
            .await
            .unwrap_err();
        assert_eq!(err.code(), StatusCode::InternalError);
        assert_eq!(err.user_message(), Some(SAVE_FAILED_MESSAGE));
    }
}
