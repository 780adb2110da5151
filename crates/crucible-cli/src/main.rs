//! Demo driver: registers the bundled suite, runs it, and writes the report
//! to the console and to a plain-text file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use crucible_core::{ColorMode, Collection, RunMode};

mod cases;

/// Crucible unit-test demo suite.
///
/// Runs the bundled factorial, fibonacci, and timing test cases, prints a
/// colorized report to the console, and writes a plain-text copy of the
/// report to a file.
#[derive(Parser)]
#[command(name = "crucible")]
#[command(version)]
struct Cli {
    /// Disable colored console output
    ///
    /// The NO_COLOR convention sets any non-empty value, so the env value
    /// goes through the falsey parser instead of the strict bool one.
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,
    /// Run cases one after another instead of on parallel threads
    #[arg(long)]
    sequential: bool,
    /// Path of the plain-text report file
    #[arg(long, default_value = "UT_report.txt")]
    report: PathBuf,
    /// Print the captured output of failed cases after the report
    #[arg(long)]
    show_output: bool,
    /// Exit with code 1 when any case failed
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let collection = Collection::global();
    cases::register_all(collection);

    println!(
        "Running {} test case{}",
        collection.len().to_string().bold(),
        if collection.len() == 1 { "" } else { "s" }
    );
    println!();

    let mode = if cli.sequential {
        RunMode::Sequential
    } else {
        RunMode::Parallel
    };
    collection.run_all_with(mode);

    let console_mode = if cli.no_color {
        ColorMode::Plain
    } else {
        ColorMode::Colorized
    };
    let mut stdout = io::stdout().lock();
    collection.render(&mut stdout, console_mode)?;
    drop(stdout);

    if cli.show_output {
        for case in collection
            .case_reports()
            .iter()
            .filter(|case| case.failed && !case.output.is_empty())
        {
            println!();
            println!("{} {}", "Output of".bold(), case.name.bold());
            for line in case.output.lines() {
                println!("  {}", line.dimmed());
            }
        }
    }

    let file = File::create(&cli.report)
        .with_context(|| format!("failed to create report file {}", cli.report.display()))?;
    let mut writer = BufWriter::new(file);
    collection.render(&mut writer, ColorMode::Plain)?;
    writer.flush()?;

    println!();
    println!(
        "Report written to {}",
        cli.report.display().to_string().bold()
    );

    if cli.strict && collection.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
