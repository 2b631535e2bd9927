//! Print job orchestration.
//!
//! A job is a list of sticker files. Each one is normalized, dithered and
//! printed in order; the source file is removed once it has printed. After
//! the job, the printer is asked for its status regardless of the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_processor::{DitherAlgorithm, ImageNormalizer, RasterBitmap};
use sticker_status::{Result, ResultExt, Status};
use thermal_printer::ThermalPrinter;

pub const PRINT_FAILED_ONE: &str = "I couldn't print the sticker";
pub const PRINT_FAILED_MANY: &str = "I couldn't print the stickers";

/// How a job ended, from the requester's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Printed,
    /// The printer never confirmed. It usually printed anyway.
    Unconfirmed,
    /// Carries a user message.
    Failed(Status),
}

impl JobOutcome {
    /// What to tell the requester, if anything.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Failed(status) => status.user_message(),
            Self::Printed | Self::Unconfirmed => None,
        }
    }
}

/// Runs print jobs against one printer.
pub struct PrintJobRunner<P, N> {
    printer: P,
    normalizer: Arc<N>,
    algorithm: DitherAlgorithm,
}

impl<P, N> PrintJobRunner<P, N>
where
    P: ThermalPrinter,
    N: ImageNormalizer + 'static,
{
    pub fn new(printer: P, normalizer: N) -> Self {
        Self {
            printer,
            normalizer: Arc::new(normalizer),
            algorithm: DitherAlgorithm::Atkinson,
        }
    }

    pub fn with_algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    /// Normalize and dither one file on the blocking pool.
    pub async fn prepare(&self, path: &Path) -> Result<RasterBitmap> {
        let normalizer = Arc::clone(&self.normalizer);
        let algorithm = self.algorithm;
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || normalizer.normalize(&path)?.dither(algorithm))
            .await
            .map_err(|e| Status::internal(format!("Image worker failed: {e}")))?
    }

    /// Print every file in `paths`, stopping at the first failure.
    pub async fn print_stickers(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Err(Status::invalid_argument("No stickers to print"));
        }

        for path in paths {
            let bitmap = self
                .prepare(path)
                .await
                .context(format!("Failed to prepare {}", path.display()))?;
            let width = u16::try_from(bitmap.width_pixels()).map_err(|_| {
                Status::invalid_argument(format!(
                    "Sticker is {} dots wide, too wide to print",
                    bitmap.width_pixels()
                ))
            })?;

            self.printer
                .print_image(bitmap.as_bytes(), width)
                .await
                .context(format!("Failed to print {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = bitmap.rows(), "Printed sticker");

            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Couldn't remove printed file");
            }
        }
        Ok(())
    }

    /// Run a whole job: print, map the result for the requester, then check on
    /// the printer.
    pub async fn run(&self, paths: &[PathBuf]) -> JobOutcome {
        let outcome = match self.print_stickers(paths).await {
            Ok(()) => JobOutcome::Printed,
            Err(status) if status.is_timeout() => {
                tracing::info!(error = %status, "Printer did not confirm the print");
                JobOutcome::Unconfirmed
            }
            Err(status) => {
                tracing::error!(files = paths.len(), error = %status, "Print job failed");
                let message = if paths.len() > 1 {
                    PRINT_FAILED_MANY
                } else {
                    PRINT_FAILED_ONE
                };
                JobOutcome::Failed(status.with_user_message(message))
            }
        };

        match self.printer.printer_status().await {
            Ok(report) => tracing::info!(%report, "Printer status"),
            Err(e) => tracing::warn!(error = %e, "Failed to read printer status"),
        }
        outcome
    }
}
