use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use image_processor::StickerNormalizer;
use sticker_printer_lib::{AppConfig, FileNamer, JobOutcome, PrintJobRunner};
use thermal_printer::Printer;

#[derive(Parser)]
#[command(name = "sticker-printer")]
#[command(about = "Print stickers on an M02 Pro thermal printer")]
struct Cli {
    /// Printer device node (overrides PRINTER_PATH)
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Dither algorithm: "atkinson" or "floyd-steinberg" (overrides DITHER_ALGORITHM)
    #[arg(short, long)]
    algorithm: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one sticker per image file
    Print {
        /// Image files (PNG, JPEG, GIF, WebP, ...). They are copied to the
        /// spool directory first, so the originals are left alone.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the printer's battery level
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    sticker_printer_lib::load_dotenv();
    let mut config = AppConfig::from_env();
    if let Some(device) = cli.device {
        config.printer_path = device;
    }
    if let Some(algorithm) = cli.algorithm {
        config.dither_algorithm = algorithm;
    }
    config.validate()?;

    tracing::info!(
        device = %config.printer_path.display(),
        algorithm = %config.dither_algorithm,
        width = config.print_width,
        "Starting sticker printer"
    );

    let printer = Printer::open(&config.printer_path, config.printer_options()).await?;

    match cli.command {
        Commands::Print { files } => {
            tokio::fs::create_dir_all(&config.spool_dir)
                .await
                .with_context(|| format!("creating {}", config.spool_dir.display()))?;

            let namer = FileNamer::new();
            let mut spooled = Vec::with_capacity(files.len());
            for file in &files {
                let payload = tokio::fs::read(file)
                    .await
                    .with_context(|| format!("reading {}", file.display()))?;
                spooled.push(namer.save(&config.spool_dir, &payload).await?);
            }

            let runner = PrintJobRunner::new(printer, StickerNormalizer::new(config.print_width))
                .with_algorithm(config.algorithm()?);
            let outcome = runner.run(&spooled).await;
            if let JobOutcome::Failed(status) = outcome {
                let message = status.user_message().unwrap_or("Printing failed").to_string();
                return Err(anyhow::Error::new(status).context(message));
            }
        }
        Commands::Status => {
            let report = printer.printer_status().await?;
            println!("{report}");
        }
    }

    Ok(())
}
