//! chapsplit CLI - split PDF documents into chapters

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use chapsplit::{SplitMode, SplitOptions, SplitPlan, SplitReport, Splitter};

#[derive(Parser)]
#[command(name = "chapsplit")]
#[command(version)]
#[command(about = "Split a PDF into one file per chapter", long_about = None)]
#[command(after_help = "Examples:
  chapsplit book.pdf                      Split next to the source (book_chapters/)
  chapsplit book.pdf -o out               Choose the output directory
  chapsplit book.pdf -p 15                15 pages per block when no chapters are found
  chapsplit book.pdf --pattern '^Annex'   Add a custom heading pattern
  chapsplit book.pdf --dry-run            Only show the detected chapters")]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory (default: <FILE stem>_chapters)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Pages per file when no chapters are found
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Extra heading pattern (regular expression); may be repeated
    #[arg(long = "pattern", value_name = "REGEX")]
    patterns: Vec<String>,

    /// Show detected chapters without writing files
    #[arg(long)]
    dry_run: bool,

    /// Skip chapter detection and split into fixed-size blocks
    #[arg(long)]
    even: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Some(Commands::Info { ref input, json }) => cmd_info(input, json),
        None => match cli.input {
            Some(ref input) => cmd_split(input, &cli),
            None => {
                println!("{}", "Usage: chapsplit <FILE> [OPTIONS]".yellow());
                println!("       chapsplit --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_split(input: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = SplitOptions::new().with_pages_per_block(cli.pages as usize);
    if let Some(ref dir) = cli.output {
        options = options.with_output_dir(dir);
    }

    let mut splitter = Splitter::with_options(input, options);
    if !cli.patterns.is_empty() {
        let mut added = 0;
        for pattern in &cli.patterns {
            match splitter.add_pattern(pattern) {
                Ok(()) => added += 1,
                Err(e) => eprintln!("{}: {}", "Warning".yellow().bold(), e),
            }
        }
        if added == 0 {
            eprintln!("{}: no valid custom pattern was added", "Warning".yellow().bold());
        }
    }

    if cli.dry_run {
        let plan = splitter.plan()?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let pb = spinner("Splitting PDF...");
    let mut report = if cli.even {
        splitter.split_evenly(cli.pages as usize)
    } else {
        splitter.split()
    };

    if let Ok(ref r) = report {
        if !r.is_success() && r.mode == SplitMode::Chapters {
            pb.set_message("Chapter split incomplete, splitting evenly...");
            report = splitter.split_evenly(cli.pages as usize);
        }
    }
    pb.finish_and_clear();
    let report = report?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        return Err(format!(
            "{} of {} files could not be written",
            report.failures.len(),
            report.attempted()
        )
        .into());
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_plan(plan: &SplitPlan) {
    if plan.boundaries.is_empty() {
        println!("{}", "No chapter headings found".yellow());
    } else {
        println!(
            "{} {} chapters:",
            "Found".green().bold(),
            plan.boundaries.len()
        );
        for (i, b) in plan.boundaries.iter().enumerate() {
            println!("  {:>3}. page {:<5} {}", i + 1, b.page + 1, b.title);
        }
    }

    let mode = match plan.mode {
        SplitMode::Chapters => "by chapter",
        SplitMode::Even => "into fixed-size blocks",
    };
    println!();
    println!("{} {}", "Would split".cyan().bold(), mode);
    for range in &plan.ranges {
        println!(
            "  {} {} (pages {}-{})",
            "├─".dimmed(),
            range.file_name(),
            range.start_page + 1,
            range.end_page + 1
        );
    }
    for range in &plan.skipped {
        println!(
            "  {} {} {}",
            "└─".dimmed(),
            "skipped".yellow(),
            range.title.as_deref().unwrap_or_default()
        );
    }
}

fn print_report(report: &SplitReport) {
    let mode = match report.mode {
        SplitMode::Chapters => "chapters",
        SplitMode::Even => "page blocks",
    };
    println!(
        "{} {} {} from {} pages",
        "Split into".green().bold(),
        report.outputs.len(),
        mode,
        report.total_pages
    );

    for output in &report.outputs {
        let name = output
            .path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        let note = if output.is_partial() {
            format!(" ({} pages missing)", output.pages_skipped)
                .yellow()
                .to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", "├─".dimmed(), name, note);
    }
    for failure in &report.failures {
        println!(
            "  {} {} {}",
            "├─".dimmed(),
            "failed".red(),
            failure.error
        );
    }

    println!(
        "{} {}",
        "Output directory:".bold(),
        report.output_dir.display()
    );
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = Splitter::new(input).get_info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref version) = info.pdf_version {
        println!("{}: PDF {}", "Format".bold(), version);
    }
    println!("{}: {}", "Pages".bold(), info.total_pages);

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }
    if let Some(ref created) = info.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = info.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    if info.total_pages == 0 {
        return Err("document could not be read".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_split_args() {
        let cli = Cli::parse_from([
            "chapsplit",
            "book.pdf",
            "-o",
            "out",
            "-p",
            "15",
            "--pattern",
            "^Annex",
            "--pattern",
            "^Part",
            "--dry-run",
        ]);
        assert_eq!(cli.input, Some(PathBuf::from("book.pdf")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.pages, 15);
        assert_eq!(cli.patterns, vec!["^Annex", "^Part"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_zero_pages_rejected() {
        assert!(Cli::try_parse_from(["chapsplit", "book.pdf", "-p", "0"]).is_err());
    }

    #[test]
    fn test_info_subcommand() {
        let cli = Cli::parse_from(["chapsplit", "info", "book.pdf", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Info { json: true, .. })));
    }
}
