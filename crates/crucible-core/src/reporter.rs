//! Report rendering: separators, status lines, and the conclusion block.

use std::io::{self, Write};
use std::time::Duration;

use crate::case::CaseReport;

const SEPARATOR_WIDTH: usize = 90;
const INDENT: usize = 14;

/// Console styling for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Colorized,
    Plain,
}

/// One style table per mode, selected up front; never a runtime lookup.
struct Palette {
    reset: &'static str,
    green: &'static str,
    red: &'static str,
    yellow: &'static str,
    orange: &'static str,
}

const ANSI: Palette = Palette {
    reset: "\x1b[0m",
    green: "\x1b[38;5;40m",
    red: "\x1b[38;5;160m",
    yellow: "\x1b[38;5;226m",
    orange: "\x1b[38;5;208m",
};

const PLAIN: Palette = Palette {
    reset: "",
    green: "",
    red: "",
    yellow: "",
    orange: "",
};

impl ColorMode {
    fn palette(self) -> &'static Palette {
        match self {
            ColorMode::Colorized => &ANSI,
            ColorMode::Plain => &PLAIN,
        }
    }
}

/// Headline color: green when everything passed, red when everything
/// failed, yellow for a mixture, orange when nothing ran.
fn headline_color(palette: &Palette, failed: usize, passed: usize) -> &'static str {
    match (failed > 0, passed > 0) {
        (true, false) => palette.red,
        (false, true) => palette.green,
        (true, true) => palette.yellow,
        (false, false) => palette.orange,
    }
}

fn millis(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64() * 1000.0)
}

/// The separator line with the case name centered as `====[Name]====`,
/// padded with `=` out to the full report width.
fn separator(name: &str) -> String {
    let left = (SEPARATOR_WIDTH / 2).saturating_sub(name.len() / 2 + 2);
    let centered = format!("{}[{}]", "=".repeat(left), name);
    format!("{centered:=<SEPARATOR_WIDTH$}")
}

/// Write the whole report: headline, one block per case in registration
/// order, then the conclusion block with the run tallies.
pub(crate) fn render(
    sink: &mut dyn Write,
    cases: &[CaseReport],
    failed: usize,
    passed: usize,
    total: Duration,
    mode: ColorMode,
) -> io::Result<()> {
    let palette = mode.palette();

    write!(sink, "{}", headline_color(palette, failed, passed))?;
    writeln!(sink, "Unit Test Report:{}", palette.reset)?;

    for case in cases {
        writeln!(sink, "{}", separator(&case.name))?;
        writeln!(sink, "{:<INDENT$}{}ms", "Duration: ", millis(case.duration))?;
        write!(sink, "{:<INDENT$}", "Status: ")?;
        if case.failed {
            writeln!(sink, "{}failed{}", palette.red, palette.reset)?;
            writeln!(sink, "Report:")?;
            for failure in &case.failures {
                writeln!(sink, "{:<INDENT$}{}", "Condition: ", failure.condition())?;
                writeln!(
                    sink,
                    "{:<INDENT$}{}:{}",
                    "in File: ",
                    failure.file(),
                    failure.line()
                )?;
            }
            if let Some(error) = &case.error {
                writeln!(sink, "{:<INDENT$}{}", "Error: ", error)?;
            }
        } else {
            writeln!(sink, "{}passed{}", palette.green, palette.reset)?;
        }
    }

    writeln!(sink, "{}", "=".repeat(SEPARATOR_WIDTH))?;
    writeln!(sink, "Conclusion: ")?;
    writeln!(sink, "{:<INDENT$}{}", "Failed Tests: ", failed)?;
    writeln!(sink, "{:<INDENT$}{}", "Passed Tests: ", passed)?;
    writeln!(sink, "{:<INDENT$}{}ms", "Duration: ", millis(total))?;

    Ok(())
}
