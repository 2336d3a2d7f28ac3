use anyhow::{Context, Result};
use clap::Parser;
use memtype::cli::{Cli, OutputFormat};
use memtype::csv_output::CsvOutput;
use memtype::event::SampleReader;
use memtype::iomem::IoMem;
use memtype::json_output::{JsonIomemInfo, JsonOutput};
use memtype::session::Session;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber: warnings by default, `RUST_LOG` when set
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the sample source: a file, or stdin for `-` / no argument
fn open_samples(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open sample file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Print the classification of individual addresses
fn print_lookups(session: &Session, addrs: &[u64]) {
    for &addr in addrs {
        println!("{:#018x}  {}", addr, session.classifier().classify(addr));
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let iomem = IoMem::from_file(&args.iomem)?;
    let iomem_info = JsonIomemInfo {
        path: args.iomem.display().to_string(),
        regions: iomem.regions().len(),
        skipped_lines: iomem.skipped_lines(),
    };
    let mut session = Session::new(iomem);

    if !args.lookup.is_empty() {
        print_lookups(&session, &args.lookup);
        return Ok(());
    }

    let mut samples = SampleReader::new(open_samples(args.input.as_deref())?);
    for event in samples.by_ref() {
        let event = event.context("Failed to read samples")?;
        session.process_event(&event);
    }
    let skipped_samples = samples.skipped_lines();
    if skipped_samples > 0 {
        tracing::warn!("Skipped {} malformed sample lines", skipped_samples);
    }

    let summary = session.end();
    match args.format {
        OutputFormat::Text => print!("{}", summary.to_text()),
        OutputFormat::Json => {
            let mut output = JsonOutput::new(summary);
            output.set_iomem_info(iomem_info);
            output.set_skipped_samples(skipped_samples);
            println!("{}", output.to_json()?);
        }
        OutputFormat::Csv => print!("{}", CsvOutput::new(&summary).to_csv()),
    }

    Ok(())
}
