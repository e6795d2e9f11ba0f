//! studypdf CLI - extract PDF course material into a study bundle

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use studypdf::{
    default_output_dir, extract_file_with_progress, Error, ExtractOptions, ExtractionReport,
    Progress, TableDetectorConfig,
};

#[derive(Parser)]
#[command(name = "studypdf")]
#[command(version)]
#[command(
    about = "Extract text, images, tables, and formulas from PDF course material",
    long_about = None
)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory (default: extracted/<file stem>)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Drop images smaller than this many bytes
    #[arg(long, default_value_t = 1000, value_name = "BYTES")]
    min_image_bytes: usize,

    /// Skip unreadable pages instead of failing
    #[arg(long)]
    lenient: bool,

    /// Process pages in parallel
    #[arg(long, env = "STUDYPDF_PARALLEL")]
    parallel: bool,

    /// Do not extract images
    #[arg(long)]
    no_images: bool,

    /// Do not detect tables
    #[arg(long)]
    no_tables: bool,

    /// Reject aligned regions wider than this many columns as tables
    #[arg(long, default_value_t = 6, value_name = "N")]
    max_table_columns: usize,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.input))
    }

    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_min_image_bytes(self.min_image_bytes)
            .with_parallel(self.parallel)
            .with_table_detector(TableDetectorConfig {
                max_columns: self.max_table_columns,
                ..TableDetectorConfig::default()
            });
        if self.lenient {
            options = options.lenient();
        }
        if self.no_images {
            options = options.without_images();
        }
        if self.no_tables {
            options = options.without_tables();
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = cmd_extract(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Fail before any output directory is created
    if !cli.input.exists() {
        return Err(Error::InputNotFound(cli.input.clone()).into());
    }

    let output_dir = cli.output_dir();
    log::debug!("Writing output to {}", output_dir.display());

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        println!(
            "{} {}",
            "Processing".cyan().bold(),
            cli.input.display()
        );
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Extracting pages...");

    let on_progress = |event: Progress| match event {
        Progress::PageDone { total, .. } => {
            pb.set_length(total as u64);
            pb.inc(1);
        }
        Progress::TablesStarted => pb.set_message("Extracting tables..."),
        Progress::TablesDone { count } => pb.set_message(format!("{} table(s) found", count)),
        Progress::Writing => pb.set_message("Writing output..."),
    };

    let report = extract_file_with_progress(&cli.input, &output_dir, cli.options(), &on_progress);
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done!");

    for warning in &report.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }

    if !cli.quiet {
        print_summary(&report, &output_dir);
    }

    Ok(())
}

fn print_summary(report: &ExtractionReport, output_dir: &Path) {
    let doc = &report.document;
    let totals = &doc.totals;

    println!();
    println!("{}", "Extraction Complete".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Title".bold(), doc.title);
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {} extracted", "Images".bold(), totals.total_images);
    println!("{}: {} extracted", "Tables".bold(), totals.total_tables);
    println!("{}: {} detected", "Formulas".bold(), totals.total_formulas);
    if report.has_warnings() {
        println!("{}: {}", "Warnings".bold(), report.warnings.len().to_string().yellow());
    }

    println!();
    println!("{} {}", "Output files:".green().bold(), output_dir.display());
    println!("  {} extracted_content.json", "├─".dimmed());
    let has_images = totals.total_images > 0;
    let has_tables = totals.total_tables > 0;
    let branch = |last: bool| if last { "└─" } else { "├─" };
    println!(
        "  {} text/full_text.txt",
        branch(!has_images && !has_tables).dimmed()
    );
    if has_images {
        println!(
            "  {} images/ ({} files)",
            branch(!has_tables).dimmed(),
            totals.total_images
        );
    }
    if has_tables {
        println!("  {} tables/ ({} files)", "└─".dimmed(), totals.total_tables);
    }
}
