//! Export
//!
//! Report artifacts produced from a [`ResultSet`](crate::result_set::ResultSet):
//! a CSV text report and a PDF document.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use jiff::Timestamp;
use thiserror::Error;
use tracing::info;

pub mod csv;
pub mod pdf;
pub mod typst;

pub use csv::{CsvRow, export_csv, parse_csv_recommendations};
pub use pdf::{DocumentRenderer, RenderError, ReportDocument, export_pdf};
pub use typst::{TypstCompiler, typst_markup};

/// Prefix shared by every report filename.
pub const REPORT_PREFIX: &str = "EcoPackAI_Report";

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Text report with a comma-separated recommendations table
    Csv,
    /// Printable PDF document
    Pdf,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type of the artifact.
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Notification shown after a successful export.
    pub fn success_message(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV exported successfully!",
            ExportFormat::Pdf => "PDF exported successfully!",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        })
    }
}

/// Errors that can occur while exporting a report.
///
/// Every message names the operation that failed.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There is no loaded result set.
    #[error("Failed to export {0}: no data available to export")]
    NoData(ExportFormat),

    /// The document renderer is not installed or not reachable.
    #[error("Failed to export PDF: {0} is not available")]
    RendererUnavailable(String),

    /// The document renderer failed.
    #[error("Failed to export PDF: {0}")]
    Render(#[from] RenderError),

    /// Text serialisation failed.
    #[error("Failed to export {format}: {source}")]
    Format {
        /// Format being produced
        format: ExportFormat,
        /// Underlying error
        #[source]
        source: fmt::Error,
    },

    /// The artifact could not be saved.
    #[error("Failed to save {filename}: {source}")]
    Save {
        /// Artifact filename
        filename: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Inputs to an export that do not come from the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportContext {
    generated_at: Timestamp,
}

impl ExportContext {
    /// Context for a report generated at the given instant.
    pub fn new(generated_at: Timestamp) -> Self {
        Self { generated_at }
    }

    /// Context for a report generated now.
    pub fn now() -> Self {
        Self::new(Timestamp::now())
    }

    /// Generation instant.
    pub fn generated_at(&self) -> Timestamp {
        self.generated_at
    }

    /// Generation instant as shown inside reports.
    pub fn generated_label(&self) -> String {
        self.generated_at
            .strftime("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    }

    /// Filename for a report in the given format.
    pub fn filename(&self, format: ExportFormat) -> String {
        report_filename(format, self.generated_at)
    }
}

/// `EcoPackAI_Report_<unix-millis>.<ext>`
pub fn report_filename(format: ExportFormat, generated_at: Timestamp) -> String {
    format!(
        "{REPORT_PREFIX}_{}.{}",
        generated_at.as_millisecond(),
        format.extension()
    )
}

/// A finished, downloadable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Report format
    pub format: ExportFormat,
    /// Suggested filename
    pub filename: String,
    /// Content
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// MIME type of the content.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Save the artifact into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Save`] if the directory or file cannot be written.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let save_error = |source| ExportError::Save {
            filename: self.filename.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(save_error)?;

        let path = dir.join(&self.filename);

        fs::write(&path, &self.bytes).map_err(save_error)?;

        info!(path = %path.display(), bytes = self.bytes.len(), "{}", self.format.success_message());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn filenames_carry_the_millisecond_timestamp() -> TestResult {
        let at = Timestamp::from_millisecond(1_760_000_000_123)?;

        assert_eq!(
            report_filename(ExportFormat::Csv, at),
            "EcoPackAI_Report_1760000000123.csv"
        );
        assert_eq!(
            ExportContext::new(at).filename(ExportFormat::Pdf),
            "EcoPackAI_Report_1760000000123.pdf"
        );

        Ok(())
    }

    #[test]
    fn generated_label_is_utc() -> TestResult {
        let context = ExportContext::new("2026-01-02T03:04:05Z".parse()?);

        assert_eq!(context.generated_label(), "2026-01-02 03:04:05 UTC");

        Ok(())
    }

    #[test]
    fn errors_name_the_failed_operation() {
        assert_eq!(
            ExportError::NoData(ExportFormat::Csv).to_string(),
            "Failed to export CSV: no data available to export"
        );
        assert_eq!(
            ExportError::RendererUnavailable("typst".to_string()).to_string(),
            "Failed to export PDF: typst is not available"
        );
    }

    #[test]
    fn artifacts_are_written_into_new_directories() -> TestResult {
        let dir = tempfile::tempdir()?;
        let artifact = ExportArtifact {
            format: ExportFormat::Csv,
            filename: "report.csv".to_string(),
            bytes: b"Rank\n".to_vec(),
        };

        let path = artifact.write_into(&dir.path().join("exports"))?;

        assert_eq!(std::fs::read(&path)?, b"Rank\n");
        assert_eq!(artifact.mime(), "text/csv");

        Ok(())
    }
}
