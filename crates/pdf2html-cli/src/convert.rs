//! Conversion of a single PDF file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::debug;

use pdf2html_core::{ConversionConfig, Pdf2HtmlConfig, Progress};

/// Arguments for a conversion run.
#[derive(Args)]
pub struct ConvertArgs {
    /// The path to the input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// The path to the output HTML file [default: output.html]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The directory to save extracted images [default: images]
    #[arg(short, long)]
    images_dir: Option<PathBuf>,

    /// JSON file with default output settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTML-escape page text instead of inlining it raw
    #[arg(long)]
    escape_text: bool,
}

impl ConvertArgs {
    /// Resolve flags over config file values over built-in defaults.
    fn resolve(self) -> anyhow::Result<ConversionConfig> {
        let defaults = match &self.config {
            Some(path) => Pdf2HtmlConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Pdf2HtmlConfig::default(),
        };

        let mut config = defaults.for_input(self.input);
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(images_dir) = self.images_dir {
            config.images_dir = images_dir;
        }
        config.escape_text |= self.escape_text;
        Ok(config)
    }
}

/// Prints conversion milestones to stdout.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn started(&mut self, input: &Path) {
        println!("Starting conversion of '{}'...", input.display());
    }

    fn page_processed(&mut self, page: u32, total: u32) {
        println!("Processed page {}/{}", page, total);
    }

    fn rendering(&mut self) {
        println!("Generating HTML file...");
    }

    fn finished(&mut self, output: &Path, images_dir: &Path) {
        println!(
            "{} Conversion complete. Output saved to '{}' and '{}/'",
            style("✓").green(),
            output.display(),
            images_dir.display()
        );
    }
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    debug!("Resolved configuration: {:?}", config);

    let report = pdf2html_core::convert(&config, &mut ConsoleProgress)
        .with_context(|| format!("Conversion of '{}' failed", config.input.display()))?;

    debug!(
        "Converted {} pages with {} images",
        report.page_count(),
        report.image_count()
    );
    Ok(())
}
