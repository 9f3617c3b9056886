use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use pyquote::config::{load_from_path, resolve_config_path, Config};
use pyquote::{discover_files, FileReport, FileStatus, Fixer, Mode, RewritePipeline};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pyquote")]
#[command(
    about = "Rewrite single-quoted Python string literals to double quotes",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Python files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Check only - report files that would change without modifying them
    #[arg(short, long)]
    check: bool,

    /// Show unified diff of changes (text output only)
    #[arg(short, long)]
    diff: bool,

    /// TOML config file (falls back to $PYQUOTE_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log debug details and list consistent files
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Default, Serialize)]
struct Summary {
    consistent: usize,
    rewritten: usize,
    inconsistent: usize,
    conflicts: usize,
    failed: usize,
}

#[derive(Serialize)]
struct Failure {
    path: PathBuf,
    error: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    failures: &'a [Failure],
    summary: &'a Summary,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 1. Load configuration
    let config = match resolve_config_path(cli.config.clone()) {
        Some(path) => load_from_path(&path)?,
        None => Config::default(),
    };

    // 2. Expand paths into files
    let files = discover_files(&cli.paths, &config.files)?;
    if files.is_empty() {
        anyhow::bail!("No Python files found in the given paths");
    }

    let mode = if cli.check { Mode::Check } else { Mode::Write };
    let fixer = Fixer::new(RewritePipeline::new(config.quote_grammar()), mode);
    let text = cli.format == OutputFormat::Text;

    // 3. Process files one at a time; a failure never stops the batch
    let mut summary = Summary::default();
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for path in &files {
        match fixer.fix_file(path) {
            Ok(fixed) => {
                let report = fixed.report;
                match report.status {
                    FileStatus::Consistent => summary.consistent += 1,
                    FileStatus::Rewritten => summary.rewritten += 1,
                    FileStatus::Inconsistent => summary.inconsistent += 1,
                }
                summary.conflicts += report.stats.conflicts;

                if text {
                    print_report(&report, cli.verbose);
                    if cli.diff && report.status != FileStatus::Consistent {
                        display_diff(
                            &report.path,
                            &String::from_utf8_lossy(&fixed.original),
                            &String::from_utf8_lossy(&fixed.rewritten),
                        );
                    }
                }
                reports.push(report);
            }
            Err(e) => {
                if text {
                    eprintln!("{} {}: Error - {}", "✗".red(), path.display(), e);
                }
                summary.failed += 1;
                failures.push(Failure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    // 4. Summary
    if text {
        print_summary(&summary, mode);
    } else {
        let report = JsonReport {
            files: &reports,
            failures: &failures,
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if summary.failed > 0 || summary.inconsistent > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pyquote=debug" } else { "pyquote=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_report(report: &FileReport, verbose: bool) {
    let path = report.path.display();
    let rewritten = report.stats.rewritten;

    match report.status {
        FileStatus::Rewritten => {
            println!("{} {}: Rewrote {} literal(s)", "✓".green(), path, rewritten);
        }
        FileStatus::Inconsistent => {
            println!(
                "{} {}: {} literal(s) would be rewritten",
                "✗".red(),
                path,
                rewritten
            );
        }
        FileStatus::Consistent if verbose => {
            println!("{} {}: Already consistent", "⊙".yellow(), path);
        }
        FileStatus::Consistent => {}
    }

    if report.stats.conflicts > 0 {
        println!(
            "  {} {} literal(s) left single-quoted (body contains double quotes)",
            "⊘".cyan(),
            report.stats.conflicts
        );
    }
}

fn print_summary(summary: &Summary, mode: Mode) {
    println!();
    println!("{}", "Summary:".bold());
    match mode {
        Mode::Write => println!("  {} rewritten", format!("{}", summary.rewritten).green()),
        Mode::Check => println!(
            "  {} inconsistent",
            format!("{}", summary.inconsistent).red()
        ),
    }
    println!(
        "  {} already consistent",
        format!("{}", summary.consistent).yellow()
    );
    println!(
        "  {} conflicting literals",
        format!("{}", summary.conflicts).cyan()
    );
    println!("  {} failed", format!("{}", summary.failed).red());
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (unified)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}
