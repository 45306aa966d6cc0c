// src/main.rs
mod exporters;
mod extractors;
mod nfce;
mod storage;
mod utils;

use clap::{Parser, ValueEnum};
use exporters::ExportFormat;
use extractors::NfceExtractor;
use std::path::{Path, PathBuf};
use storage::StorageManager;
use utils::AppError;

/// Output selection: one export format, or all of them.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Xml,
    Csv,
    Xlsx,
    Json,
    All,
}

impl OutputFormat {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            OutputFormat::Xml => vec![ExportFormat::Xml],
            OutputFormat::Csv => vec![ExportFormat::Csv],
            OutputFormat::Xlsx => vec![ExportFormat::Xlsx],
            OutputFormat::Json => vec![ExportFormat::Json],
            OutputFormat::All => ExportFormat::ALL.to_vec(),
        }
    }
}

/// Command Line Interface for the NFC-e receipt extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Saved NFC-e consultation page (HTML)
    #[arg(short, long)]
    input: PathBuf,

    /// Export format to produce
    #[arg(short, long, value_enum, default_value_t = OutputFormat::All)]
    format: OutputFormat,

    /// Output directory for exported files
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Debug mode - save an annotated copy of the page with extraction anchors highlighted
    #[arg(short, long)]
    debug: bool,
}

/// Name used for the output folder when the receipt carries no key or number.
fn fallback_id(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "nfce".to_string())
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    if !args.input.is_file() {
        return Err(AppError::Config(format!(
            "Input file not found: {}",
            args.input.display()
        )));
    }

    // 2. Read and extract
    let raw = std::fs::read(&args.input)?;
    tracing::info!("Read {} ({} bytes)", args.input.display(), raw.len());

    let extractor = NfceExtractor::new();
    let result = extractor.extract_bytes(&raw)?;

    if result.items.is_empty() {
        tracing::warn!("No line items found in {}", args.input.display());
    }

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;
    let document_id = result
        .document_id()
        .unwrap_or_else(|| fallback_id(&args.input));

    if args.debug {
        let debug_dir = storage.document_dir(&document_id)?.join("debug");
        std::fs::create_dir_all(&debug_dir)?;
        match std::str::from_utf8(&raw) {
            Ok(html) => {
                if let Err(e) = utils::html_debug::create_debug_html(html, &debug_dir.join("annotated.html")) {
                    tracing::warn!("Failed to create debug HTML: {}", e);
                }
            }
            Err(e) => tracing::warn!("Skipping debug HTML, input is not UTF-8: {}", e),
        }
    }

    // 4. Export
    let formats = args.format.formats();
    let mut success_count = 0;
    let mut failure_count = 0;

    for format in &formats {
        let exporter = format.exporter();
        match exporter.export(&result) {
            Ok(bytes) => match storage.save_export(&document_id, exporter.format(), &bytes) {
                Ok(path) => {
                    tracing::info!("Wrote {}", path.display());
                    success_count += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to save {:?} export: {}", format, e);
                    failure_count += 1;
                }
            },
            Err(e) => {
                tracing::error!("Failed to export {:?}: {}", format, e);
                failure_count += 1;
            }
        }
    }

    if let Err(e) = storage.save_metadata(&document_id, &result, &args.input, &formats) {
        tracing::error!("Failed to save metadata: {}", e);
    }

    tracing::info!(
        "Processing finished. {} items; exports succeeded: {}, failed: {}",
        result.item_count(),
        success_count,
        failure_count
    );

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "All {} exports failed for {}",
            failure_count,
            args.input.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_expands_to_every_format() {
        assert_eq!(OutputFormat::All.formats(), ExportFormat::ALL.to_vec());
        assert_eq!(OutputFormat::Csv.formats(), vec![ExportFormat::Csv]);
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::try_parse_from(["nfce_extractor", "--input", "cupom.html"]).unwrap();
        assert_eq!(args.format, OutputFormat::All);
        assert_eq!(args.output_dir, PathBuf::from("./output"));
        assert!(!args.debug);

        let args = Args::try_parse_from(["nfce_extractor", "-i", "c.html", "-f", "xlsx"]).unwrap();
        assert_eq!(args.format, OutputFormat::Xlsx);
    }

    #[test]
    fn test_fallback_id_uses_file_stem() {
        assert_eq!(fallback_id(Path::new("/tmp/cupom_maio.html")), "cupom_maio");
    }
}
