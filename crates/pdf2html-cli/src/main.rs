//! CLI application converting a PDF into a static HTML page.

mod convert;

use std::process::ExitCode;

use clap::Parser;
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use convert::ConvertArgs;

/// Convert a PDF file to an HTML file with extracted images
#[derive(Parser)]
#[command(name = "pdf2html")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    convert: ConvertArgs,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").for_stderr().red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Progress lines own stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    convert::run(cli.convert)
}
