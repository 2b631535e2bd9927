//! Sticker printing front end: configuration, spool file naming and print
//! job orchestration on top of the image pipeline and the printer driver.

pub mod config;
pub mod files;
pub mod jobs;

pub use config::AppConfig;
pub use files::FileNamer;
pub use jobs::{JobOutcome, PrintJobRunner};

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
