//! Interactive MP3 ingest prompt
//!
//! Repeatedly asks for a path until one validates, then decodes it and
//! prints a summary.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example ingest_prompt
//!
//! # JSON logs
//! cargo run -p core-service --example ingest_prompt -- json
//! ```

use anyhow::{bail, Context};
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use core_service::IngestService;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Info)
            .with_target(false),
    )
    .context("failed to initialize logging")?;

    println!("MP3 File Validator");
    println!("------------------");

    let service = IngestService::new();
    let path = prompt_until_valid(&service)?;

    println!("\nFile ready for use: {}", path.display());

    let track = service
        .ingest(&path)
        .with_context(|| format!("failed to ingest {}", path.display()))?;

    if let Some(metadata) = &track.report.metadata {
        println!("\nMP3 Metadata (ID3v1):\n{}", metadata);
    }

    println!(
        "\nDecoded {} samples: {} Hz, {} channel(s), {:.2} s",
        track.audio.samples().len(),
        track.audio.sample_rate(),
        track.audio.channels(),
        track.audio.duration().as_secs_f64()
    );

    Ok(())
}

fn prompt_until_valid(service: &IngestService) -> anyhow::Result<PathBuf> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let limit_mib = service.validator().config().max_file_size_bytes / (1024 * 1024);

    loop {
        print!("Enter the path to the .mp3 file (max {} MiB): ", limit_mib);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            bail!("input closed before a valid file was given");
        };
        let path = PathBuf::from(line?.trim());

        match service.validator().check(&path) {
            Ok(_) => {
                println!("File validated successfully.");
                return Ok(path);
            }
            Err(rejection) => println!("Invalid input ({}). Please try again.", rejection),
        }
    }
}
