/*!
 * Reporting functionality for llmcopy
 *
 * Renders the summary of a finished copy with the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::BuildResult;
use crate::utils::{format_file_size, format_number};

/// Statistics of one finished copy
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// Where the content went (clipboard, stdout or a file path)
    pub destination: String,
    /// Time from collection to placement
    pub duration: Duration,
    /// Files whose content was emitted
    pub files_copied: usize,
    /// Files annotated instead of emitted
    pub files_skipped: usize,
    /// Lines in the final text
    pub total_lines: usize,
    /// Characters in the final text
    pub total_chars: usize,
    /// UTF-8 size of the final text
    pub total_bytes: u64,
}

impl CopyReport {
    /// Collect the statistics of `result`
    pub fn from_result(result: &BuildResult, destination: impl Into<String>, duration: Duration) -> Self {
        Self {
            destination: destination.into(),
            duration,
            files_copied: result.file_count,
            files_skipped: result.skipped_count,
            total_lines: result.line_count(),
            total_chars: result.char_count(),
            total_bytes: result.content.len() as u64,
        }
    }
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// One summary line
    Plain,
}

/// Report generator for finished copies
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate the report text
    pub fn generate_report(&self, report: &CopyReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
            ReportFormat::Plain => format!(
                "{} files, {} skipped, {} characters -> {}",
                report.files_copied, report.files_skipped, report.total_chars, report.destination
            ),
        }
    }

    /// Print the report to stderr, keeping stdout for the content itself
    pub fn print_report(&self, report: &CopyReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &CopyReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📋 Destination",
                value: report.destination.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Copied",
                value: format_number(report.files_copied),
            },
            SummaryRow {
                key: "⏭️ Files Skipped",
                value: format_number(report.files_skipped),
            },
            SummaryRow {
                key: "📝 Total Lines",
                value: format_number(report.total_lines),
            },
            SummaryRow {
                key: "🔤 Characters",
                value: format!(
                    "{} ({})",
                    format_number(report.total_chars),
                    format_file_size(report.total_bytes)
                ),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &CopyReport) -> String {
        format!("✅  COPY COMPLETE\n{}", self.create_summary_table(report))
    }
}
