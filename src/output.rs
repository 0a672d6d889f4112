//! Output sinks for search results.
//!
//! Two formats are supported:
//! - CSV, streamed row by row to a file or standard output
//! - a spreadsheet (xlsx), accumulated in memory and saved to a file on finalize
//!
//! The format is chosen once, by [`open_sink`].

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::OutputError;
use crate::pager::ResultRecord;

/// Format used for timestamps in every sink.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rows in one xlsx worksheet.
pub const SPREADSHEET_MAX_ROWS: u32 = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    /// `xls` and `xlsx` both produce an xlsx workbook
    Spreadsheet,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xls" | "xlsx" => Ok(OutputFormat::Spreadsheet),
            _ => Err(OutputError::UnknownOutputFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Spreadsheet => write!(f, "xlsx"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

/// Destination for result rows.
pub trait OutputSink {
    /// Appends one `[timestamp, text]` row.
    ///
    /// Returns `OutputError::RowLimit` once the sink cannot hold another row.
    /// Rows already written are still saved by [`OutputSink::finalize`].
    fn write(&mut self, record: &ResultRecord) -> Result<(), OutputError>;

    /// Flushes or serializes everything written so far.
    fn finalize(self: Box<Self>) -> Result<(), OutputError>;
}

/// Streams rows as CSV.
///
/// Tweet text is written as raw UTF-8 bytes so nothing is re-encoded on the way out.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        CsvSink {
            writer: csv::Writer::from_writer(inner),
            rows: 0,
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, OutputError> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl<W: Write> OutputSink for CsvSink<W> {
    fn write(&mut self, record: &ResultRecord) -> Result<(), OutputError> {
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        self.writer
            .write_record([timestamp.as_bytes(), record.text.as_bytes()])?;
        self.rows += 1;
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<(), OutputError> {
        self.writer.flush()?;
        debug!("CSV sink flushed after {} rows", self.rows);
        Ok(())
    }
}

/// Collects rows in a worksheet and saves the workbook on finalize.
pub struct SpreadsheetSink {
    path: PathBuf,
    worksheet: Worksheet,
    next_row: u32,
}

impl SpreadsheetSink {
    /// Fails with `UnsupportedDestination` for standard output, since the
    /// workbook is binary.
    pub fn new(destination: &OutputDestination) -> Result<Self, OutputError> {
        match destination {
            OutputDestination::Stdout => Err(OutputError::UnsupportedDestination),
            OutputDestination::File(path) => Ok(SpreadsheetSink {
                path: path.clone(),
                worksheet: Worksheet::new(),
                next_row: 0,
            }),
        }
    }
}

impl OutputSink for SpreadsheetSink {
    fn write(&mut self, record: &ResultRecord) -> Result<(), OutputError> {
        if self.next_row >= SPREADSHEET_MAX_ROWS {
            return Err(OutputError::RowLimit(SPREADSHEET_MAX_ROWS));
        }
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        self.worksheet.write_string(self.next_row, 0, &timestamp)?;
        self.worksheet
            .write_string(self.next_row, 1, &record.text)?;
        self.next_row += 1;
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<(), OutputError> {
        let SpreadsheetSink {
            path,
            worksheet,
            next_row,
        } = *self;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        workbook.save(&path)?;
        info!("Saved {} rows to workbook {}", next_row, path.display());
        Ok(())
    }
}

/// Builds the sink for `format` writing to `destination`.
///
/// Files are created here, before any search request is made.
///
/// # Errors
///
/// - `OutputError::UnsupportedDestination` for a spreadsheet on standard output
/// - `OutputError::Io` if the CSV output file cannot be created
pub fn open_sink(
    format: OutputFormat,
    destination: &OutputDestination,
) -> Result<Box<dyn OutputSink>, OutputError> {
    debug!("Opening {} sink for {:?}", format, destination);
    match (format, destination) {
        (OutputFormat::Csv, OutputDestination::Stdout) => Ok(Box::new(CsvSink::new(io::stdout()))),
        (OutputFormat::Csv, OutputDestination::File(path)) => {
            let file = File::create(path)?;
            Ok(Box::new(CsvSink::new(file)))
        }
        (OutputFormat::Spreadsheet, _) => Ok(Box::new(SpreadsheetSink::new(destination)?)),
    }
}
