//! Runtime configuration loaded from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use image_processor::DitherAlgorithm;
use thermal_printer::PrinterOptions;

pub const DEFAULT_PRINTER_PATH: &str = "/dev/rfcomm0";
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CHUNK: usize = 0x10000;
pub const DEFAULT_PRINT_WIDTH: u32 = image_processor::PRINT_WIDTH;
pub const DEFAULT_DITHER_ALGORITHM: &str = "atkinson";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub printer_path: PathBuf,
    pub read_timeout_secs: u64,
    pub max_chunk: usize,
    pub print_width: u32,
    pub dither_algorithm: String,
    /// Where incoming stickers are copied before printing.
    pub spool_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            printer_path: DEFAULT_PRINTER_PATH.into(),
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_chunk: DEFAULT_MAX_CHUNK,
            print_width: DEFAULT_PRINT_WIDTH,
            dither_algorithm: DEFAULT_DITHER_ALGORITHM.into(),
            spool_dir: default_spool_dir(),
        }
    }
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each key. Unset or unparsable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String { lookup(key).unwrap_or_default().trim().to_string() };

        Self {
            printer_path: {
                let p = g("PRINTER_PATH");
                if p.is_empty() { DEFAULT_PRINTER_PATH.into() } else { p.into() }
            },
            read_timeout_secs: parse_or(&g("PRINTER_READ_TIMEOUT_SECS"), DEFAULT_READ_TIMEOUT_SECS),
            max_chunk: parse_or(&g("PRINTER_MAX_CHUNK"), DEFAULT_MAX_CHUNK),
            print_width: parse_or(&g("PRINT_WIDTH"), DEFAULT_PRINT_WIDTH),
            dither_algorithm: {
                let a = g("DITHER_ALGORITHM");
                if a.is_empty() { DEFAULT_DITHER_ALGORITHM.into() } else { a }
            },
            spool_dir: {
                let d = g("SPOOL_DIR");
                if d.is_empty() { default_spool_dir() } else { d.into() }
            },
        }
    }

    /// Reject values the driver or the dithering engine cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.print_width == 0 || self.print_width % 8 != 0 {
            bail!(
                "PRINT_WIDTH must be a non-zero multiple of 8, got {}",
                self.print_width
            );
        }
        if self.print_width > u32::from(u16::MAX) {
            bail!("PRINT_WIDTH {} is wider than any printer", self.print_width);
        }
        if self.max_chunk == 0 {
            bail!("PRINTER_MAX_CHUNK must not be zero");
        }
        if self.read_timeout_secs == 0 {
            bail!("PRINTER_READ_TIMEOUT_SECS must not be zero");
        }
        self.algorithm()?;
        Ok(())
    }

    pub fn algorithm(&self) -> anyhow::Result<DitherAlgorithm> {
        Ok(self.dither_algorithm.parse::<DitherAlgorithm>()?)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn printer_options(&self) -> PrinterOptions {
        PrinterOptions::new()
            .with_read_timeout(self.read_timeout())
            .with_max_chunk(self.max_chunk)
    }
}

fn default_spool_dir() -> PathBuf {
    std::env::temp_dir().join("sticker-printer")
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
