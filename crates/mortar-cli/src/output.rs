//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use mortar_core::application::{FileStatus, RunReport};
use owo_colors::OwoColorize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on flags and configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Flag, then config, then terminal detection.
        let requested = match args.output_format {
            OutputFormat::Auto => config.output.format,
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format == OutputFormat::Plain,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Print a run report in the resolved format.
    ///
    /// JSON is printed even in quiet mode: it was asked for explicitly.
    pub fn report(&self, report: &RunReport) -> io::Result<()> {
        if self.resolved_format == OutputFormat::Json {
            let json = serde_json::to_string_pretty(report)?;
            return self.term.write_line(&json);
        }

        let mode = if report.dry_run { " (dry run)" } else { "" };
        self.header(&format!(
            "Generating {} entit{} into {}{mode}",
            report.entities,
            if report.entities == 1 { "y" } else { "ies" },
            report.root.display()
        ))?;
        for line in report_lines(report) {
            let line = if self.no_color {
                line.text
            } else if line.written {
                line.text.green().to_string()
            } else {
                line.text.dimmed().to_string()
            };
            self.print(&line)?;
        }

        let summary = format!(
            "{} written, {} unchanged",
            report.written(),
            report.unchanged()
        );
        if report.dry_run {
            self.warning(&format!("{summary}; nothing was written (dry run)"))
        } else {
            self.success(&summary)
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

/// One uncoloured report row.
struct ReportLine {
    text: String,
    written: bool,
}

fn report_lines(report: &RunReport) -> Vec<ReportLine> {
    let files = report.files.iter().map(|file| ReportLine {
        text: format!(
            "  {:<11} {}  ({} {})",
            file.change.status.as_str(),
            file.change.path.display(),
            file.entity,
            file.component
        ),
        written: file.change.status.is_written(),
    });
    let artifacts = report.artifacts.iter().map(|artifact| {
        let status = if artifact.written {
            FileStatus::Updated.as_str()
        } else {
            FileStatus::Unchanged.as_str()
        };
        ReportLine {
            text: format!(
                "  {status:<11} {}  ({} {})",
                artifact.path.display(),
                artifact.entity,
                artifact.artifact
            ),
            written: artifact.written,
        }
    });
    files.chain(artifacts).collect()
}

// ── tests ─────────────────────────────────────────────────────────────────────
