//! # Inkslip CLI
//!
//! Command-line interface for the receipt printer service.
//!
//! ## Usage
//!
//! ```bash
//! # Run the webhook server against the USB serial printer
//! inkslip serve --device /dev/ttyACM0 --port 3000
//!
//! # Same, configured from the environment
//! SERIAL_PORT=/dev/ttyUSB0 PORT=8080 inkslip serve
//!
//! # Print one event from a JSON file
//! inkslip print --kind issue issue.json
//!
//! # Capture the bytes instead of printing
//! inkslip print --kind todo todo.json --output todo.bin
//!
//! # Halftone uploaded photos instead of a hard threshold
//! inkslip print --kind image photo.json --dither bayer
//! ```
//!
//! Logging is controlled by `INKSLIP_LOG` (an `EnvFilter` directive) and
//! `INKSLIP_LOG_FORMAT` (`compact` or `json`).

use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use inkslip::{
    InkslipError, PrintQueue, PrinterConfig,
    event::EventKind,
    normalize::Normalizer,
    render::{dither::DitheringAlgorithm, fetch::HttpFetcher},
    server::{self, ServerConfig},
    transport::{Device, FileDevice, SerialDevice, serial},
};

/// Letterhead printed above every issue receipt. Optional.
const LOGO_PATH: &str = "assets/github.png";

/// Inkslip - webhook receipt printer
#[derive(Parser, Debug)]
#[command(name = "inkslip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Serial device the printer is attached to
        #[arg(long, env = "SERIAL_PORT", default_value = serial::DEFAULT_DEVICE)]
        device: PathBuf,

        /// HTTP listen port
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Quantizer for uploaded images
        #[arg(long, env = "INKSLIP_DITHER", value_enum, default_value = "threshold")]
        dither: Dither,
    },

    /// Print a single event read from a JSON file
    Print {
        /// Event JSON (the `issue` or `image` object of a webhook payload)
        file: PathBuf,

        /// Kind of event in the file
        #[arg(long, value_enum)]
        kind: Kind,

        /// Serial device the printer is attached to
        #[arg(long, env = "SERIAL_PORT", default_value = serial::DEFAULT_DEVICE)]
        device: PathBuf,

        /// Write the command stream to this file instead of the printer
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Quantizer for uploaded images
        #[arg(long, env = "INKSLIP_DITHER", value_enum, default_value = "threshold")]
        dither: Dither,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Issue,
    Todo,
    Image,
}

impl From<Kind> for EventKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Issue => EventKind::Issue,
            Kind::Todo => EventKind::Todo,
            Kind::Image => EventKind::Image,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Dither {
    /// Hard 50% cut
    Threshold,
    /// 8x8 ordered halftone
    Bayer,
}

impl From<Dither> for DitheringAlgorithm {
    fn from(dither: Dither) -> Self {
        match dither {
            Dither::Threshold => DitheringAlgorithm::Threshold,
            Dither::Bayer => DitheringAlgorithm::Bayer,
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("INKSLIP_LOG").unwrap_or_else(|_| EnvFilter::new("inkslip=info,warn"));

    let format = env::var("INKSLIP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

async fn run() -> Result<(), InkslipError> {
    let cli = Cli::parse();
    let config = PrinterConfig::RECEIPT_80MM;

    match cli.command {
        Commands::Serve { device, port, dither } => {
            let device = SerialDevice::new(device, config.baud_rate);
            let (queue, _worker) = PrintQueue::start(normalizer(config, dither)?, Arc::new(device));
            server::serve(ServerConfig::with_port(port), queue).await
        }
        Commands::Print {
            file,
            kind,
            device,
            output,
            dither,
        } => {
            let json = std::fs::read_to_string(&file)?;
            let event = EventKind::from(kind).parse(&json)?;

            let device: Arc<dyn Device> = match &output {
                Some(path) => Arc::new(FileDevice::new(path)),
                None => Arc::new(SerialDevice::new(device, config.baud_rate)),
            };
            let (queue, _worker) = PrintQueue::start(normalizer(config, dither)?, device);

            let report = queue.print(event).await?;
            info!(id = %report.id, blocks = report.blocks, bytes = report.bytes, "printed");
            if let Some(path) = output {
                println!("Wrote {} bytes to {}", report.bytes, path.display());
            } else {
                println!("Printed successfully!");
            }
            Ok(())
        }
    }
}

fn normalizer(config: PrinterConfig, dither: Dither) -> Result<Normalizer, InkslipError> {
    let normalizer = Normalizer::new(Arc::new(HttpFetcher::new()?), config).with_dithering(dither.into());

    if Path::new(LOGO_PATH).exists() {
        Ok(normalizer.with_logo(LOGO_PATH))
    } else {
        warn!(path = LOGO_PATH, "logo not found, printing without letterhead");
        Ok(normalizer)
    }
}
