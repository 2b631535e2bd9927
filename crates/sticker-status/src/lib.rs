//! Outcome type shared by the dithering engine, the printer driver and the
//! job runner.
//!
//! Every fallible operation returns [`Result<T>`]. A [`Status`] carries a
//! [`StatusCode`], an internal diagnostic message that outer layers prepend
//! context to, and an optional message meant for the person who asked for the
//! print. The two messages never mix: logs get the diagnostic, users get the
//! user message.

use std::fmt;

/// Failure kinds. Success is the `Ok` side of [`Result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// I/O failure or malformed data from an external collaborator.
    InternalError,
    /// Malformed caller input (zero width, empty selection, ...).
    InvalidArgument,
    /// The printer did not answer within the read deadline.
    Timeout,
    /// A required backing resource (source file, device node) is missing.
    NotFound,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InternalError => "Internal error",
            Self::InvalidArgument => "Invalid argument",
            Self::Timeout => "Timeout",
            Self::NotFound => "Not found",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    code: StatusCode,
    message: String,
    user_message: Option<String>,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            user_message: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalError, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    /// Attach the message shown to the end user.
    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    /// Prepend diagnostic context. The code is left untouched.
    ///
    /// `Status::internal("write failed").context("sending header")` reads
    /// `sending header: write failed`.
    pub fn context(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref();
        if self.message.is_empty() {
            self.message = prefix.to_string();
        } else {
            self.message = format!("{prefix}: {}", self.message);
        }
        self
    }

    /// Change the code on purpose, keeping both messages.
    pub fn reclassify(mut self, code: StatusCode) -> Self {
        self.code = code;
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn user_message(&self) -> Option<&str> {
        self.user_message.as_deref()
    }

    pub fn is_timeout(&self) -> bool {
        self.code == StatusCode::Timeout
    }
}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => StatusCode::NotFound,
            std::io::ErrorKind::TimedOut => StatusCode::Timeout,
            _ => StatusCode::InternalError,
        };
        Self::new(code, err.to_string())
    }
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Status>;

/// Context helpers on [`Result`], mirroring the methods on [`Status`].
pub trait ResultExt<T> {
    fn context(self, prefix: impl AsRef<str>) -> Result<T>;

    fn with_user_message(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, prefix: impl AsRef<str>) -> Result<T> {
        self.map_err(|status| status.context(prefix))
    }

    fn with_user_message(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|status| status.with_user_message(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prepends_without_changing_code() {
        let status = Status::internal("Failed to send data")
            .context("Failed to send raster image")
            .context("printing sticker 1");

        assert_eq!(status.code(), StatusCode::InternalError);
        assert_eq!(
            status.message(),
            "printing sticker 1: Failed to send raster image: Failed to send data"
        );
    }

    #[test]
    fn test_context_on_empty_message() {
        let status = Status::timeout("").context("Timed out on read");
        assert_eq!(status.message(), "Timed out on read");
        assert!(status.is_timeout());
    }

    #[test]
    fn test_user_message_is_separate() {
        let status = Status::internal("select failed with EBADF")
            .with_user_message("I couldn't print the sticker");

        assert_eq!(status.user_message(), Some("I couldn't print the sticker"));
        assert!(!status.to_string().contains("couldn't print"));
        assert!(status.to_string().contains("EBADF"));
    }

    #[test]
    fn test_display_includes_code() {
        let status = Status::invalid_argument("width must not be zero");
        assert_eq!(status.to_string(), "Invalid argument: width must not be zero");
    }

    #[test]
    fn test_reclassify_keeps_messages() {
        let status = Status::timeout("Timed out on read")
            .with_user_message("printer is asleep")
            .reclassify(StatusCode::InternalError);

        assert_eq!(status.code(), StatusCode::InternalError);
        assert_eq!(status.message(), "Timed out on read");
        assert_eq!(status.user_message(), Some("printer is asleep"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Status::not_found("Failed to open file"));
        let err = result.context("loading file-3").unwrap_err();
        assert_eq!(err.code(), StatusCode::NotFound);
        assert_eq!(err.message(), "loading file-3: Failed to open file");
    }

    #[test]
    fn test_result_ext_passes_ok_through() {
        let result: Result<u8> = Ok(7);
        assert_eq!(result.context("unused").unwrap(), 7);
    }

    #[test]
    fn test_from_io_error_kinds() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");

        assert_eq!(Status::from(missing).code(), StatusCode::NotFound);
        assert_eq!(Status::from(timed_out).code(), StatusCode::Timeout);
        assert_eq!(Status::from(broken).code(), StatusCode::InternalError);
    }
}
