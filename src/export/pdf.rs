//! PDF report
//!
//! The report content is computed here as a [`ReportDocument`]; turning it
//! into PDF bytes is the job of a [`DocumentRenderer`].

use std::io;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    export::{ExportArtifact, ExportContext, ExportError, ExportFormat},
    records::ProductField,
    result_set::ResultSet,
    statistics::{compute_statistics, format_2dp},
};

/// Report title.
pub const REPORT_TITLE: &str = "EcoPackAI Sustainability Report";

/// Fixed footer line.
pub const FOOTER_NOTICE: &str = "EcoPackAI © 2026 - Sustainable Packaging Intelligence";

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendering tool could not be started.
    #[error("{0} is not available")]
    Unavailable(String),

    /// Failure preparing or reading render files.
    #[error("render I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The rendering tool reported an error.
    #[error("renderer failed: {0}")]
    Failed(String),

    /// The renderer produced something that is not a PDF.
    #[error("renderer output is not a PDF document")]
    CorruptOutput,
}

/// External capability that lays out a [`ReportDocument`] as a PDF.
pub trait DocumentRenderer {
    /// Human-readable name used in error messages.
    fn name(&self) -> &str;

    /// Whether the renderer can be used right now.
    fn is_available(&self) -> bool;

    /// Render the document to PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if rendering fails.
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError>;
}

/// A simple table: header cells plus rows of the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    /// Header cells
    pub head: Vec<String>,
    /// Body rows
    pub rows: Vec<Vec<String>>,
}

/// The highlighted best-recommendation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestPanel {
    /// Panel heading
    pub heading: String,
    /// Panel text
    pub text: String,
}

/// A titled list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section heading
    pub heading: String,
    /// Lines of text
    pub lines: Vec<String>,
}

/// Structured report content, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Document title
    pub title: String,
    /// Product description
    pub product: Section,
    /// Heading above the recommendations table
    pub table_heading: String,
    /// Recommendations in rank order
    pub table: ReportTable,
    /// Averages
    pub statistics: Section,
    /// Best recommendation
    pub best: BestPanel,
    /// Footer lines
    pub footer: Vec<String>,
}

impl ReportDocument {
    /// Lay out the report content for a result set.
    pub fn from_result_set(result_set: &ResultSet, context: &ExportContext) -> Self {
        let info = result_set.product_info_or_default();
        let stats = compute_statistics(result_set);

        let product = Section {
            heading: "Product Information".to_string(),
            lines: vec![
                format!("Product Name: {}", info.display(ProductField::Name)),
                format!("Weight: {} kg", info.display(ProductField::WeightKg)),
                format!("Category: {}", info.display(ProductField::Category)),
                format!(
                    "Fragility Index: {}",
                    info.display(ProductField::FragilityIndex)
                ),
                format!("Shipping Type: {}", info.display(ProductField::ShippingType)),
            ],
        };

        let table = ReportTable {
            head: ["Rank", "Material", "Cost (Rs.)", "CO2 (kg)", "Score"]
                .map(String::from)
                .to_vec(),
            rows: result_set
                .records()
                .iter()
                .map(|record| {
                    vec![
                        record.rank.to_string(),
                        record.material.clone(),
                        format_2dp(record.predicted_cost.value()),
                        format_2dp(record.co2.value()),
                        format_2dp(record.sustainability_score.value()),
                    ]
                })
                .collect(),
        };

        let statistics = Section {
            heading: "Summary Statistics".to_string(),
            lines: vec![
                format!("Average Cost: Rs.{}", format_2dp(stats.avg_cost)),
                format!("Average CO2 Impact: {} kg", format_2dp(stats.avg_co2)),
                format!(
                    "Average Sustainability Score: {}/100",
                    format_2dp(stats.avg_sustainability)
                ),
            ],
        };

        let best = BestPanel {
            heading: "Best Recommendation".to_string(),
            text: result_set.best().map_or_else(String::new, |record| {
                format!(
                    "{} — Sustainability Score: {}",
                    record.material, record.sustainability_score
                )
            }),
        };

        Self {
            title: REPORT_TITLE.to_string(),
            product,
            table_heading: "Material Recommendations".to_string(),
            table,
            statistics,
            best,
            footer: vec![
                format!("Generated: {}", context.generated_label()),
                FOOTER_NOTICE.to_string(),
            ],
        }
    }
}

/// Render a result set to a PDF artifact.
///
/// Fails fast, before any content is produced, when the renderer is unavailable.
///
/// # Errors
///
/// - [`ExportError::RendererUnavailable`]: the renderer cannot be used.
/// - [`ExportError::Render`]: rendering failed or produced a non-PDF result.
pub fn export_pdf(
    result_set: &ResultSet,
    context: &ExportContext,
    renderer: &dyn DocumentRenderer,
) -> Result<ExportArtifact, ExportError> {
    if !renderer.is_available() {
        error!(renderer = renderer.name(), "PDF renderer unavailable");

        return Err(ExportError::RendererUnavailable(renderer.name().to_string()));
    }

    let document = ReportDocument::from_result_set(result_set, context);

    let bytes = renderer
        .render(&document)
        .and_then(|bytes| {
            if bytes.starts_with(b"%PDF-") {
                Ok(bytes)
            } else {
                Err(RenderError::CorruptOutput)
            }
        })
        .map_err(|render_error| {
            error!(renderer = renderer.name(), "PDF rendering failed: {render_error}");

            ExportError::Render(render_error)
        })?;

    info!(renderer = renderer.name(), bytes = bytes.len(), "rendered PDF report");

    Ok(ExportArtifact {
        format: ExportFormat::Pdf,
        filename: context.filename(ExportFormat::Pdf),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::records::PredictionRecord;

    use super::*;

    #[derive(Debug)]
    struct FakeRenderer {
        available: bool,
        output: &'static [u8],
        seen: RefCell<Vec<ReportDocument>>,
    }

    impl FakeRenderer {
        fn new(available: bool, output: &'static [u8]) -> Self {
            Self {
                available,
                output,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl DocumentRenderer for FakeRenderer {
        fn name(&self) -> &str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
            self.seen.borrow_mut().push(document.clone());

            Ok(self.output.to_vec())
        }
    }

    fn dec(text: &str) -> Result<Decimal, rust_decimal::Error> {
        text.parse()
    }

    fn example_set() -> TestResult<ResultSet> {
        Ok(ResultSet::new(
            vec![
                PredictionRecord::new(1, "Recycled Cardboard", dec("12.5")?, dec("0.8")?, dec("92")?)?,
                PredictionRecord::new(2, "Bubble Wrap", dec("8.0")?, dec("2.1")?, dec("61")?)?,
            ],
            None,
        )?)
    }

    fn context() -> TestResult<ExportContext> {
        Ok(ExportContext::new(Timestamp::from_millisecond(
            1_767_225_600_000,
        )?))
    }

    #[test]
    fn document_carries_report_content_in_order() -> TestResult {
        let document = ReportDocument::from_result_set(&example_set()?, &context()?);

        assert_eq!(document.title, REPORT_TITLE);
        assert_eq!(
            document.product.lines.first().map(String::as_str),
            Some("Product Name: N/A")
        );
        assert_eq!(
            document.table.rows.first(),
            Some(&vec![
                "1".to_string(),
                "Recycled Cardboard".to_string(),
                "12.50".to_string(),
                "0.80".to_string(),
                "92.00".to_string(),
            ])
        );
        assert_eq!(
            document.statistics.lines,
            [
                "Average Cost: Rs.10.25",
                "Average CO2 Impact: 1.45 kg",
                "Average Sustainability Score: 76.50/100",
            ]
        );
        assert_eq!(
            document.best.text,
            "Recycled Cardboard — Sustainability Score: 92"
        );
        assert_eq!(
            document.footer,
            [
                "Generated: 2026-01-01 00:00:00 UTC",
                FOOTER_NOTICE,
            ]
        );

        Ok(())
    }

    #[test]
    fn export_hands_document_to_renderer() -> TestResult {
        let renderer = FakeRenderer::new(true, b"%PDF-1.7 fake");

        let artifact = export_pdf(&example_set()?, &context()?, &renderer)?;

        assert_eq!(artifact.filename, "EcoPackAI_Report_1767225600000.pdf");
        assert_eq!(artifact.mime(), "application/pdf");
        assert_eq!(artifact.bytes, b"%PDF-1.7 fake");
        assert_eq!(renderer.seen.borrow().len(), 1);

        Ok(())
    }

    #[test]
    fn unavailable_renderer_fails_fast() -> TestResult {
        let renderer = FakeRenderer::new(false, b"%PDF-1.7");

        let result = export_pdf(&example_set()?, &context()?, &renderer);

        assert!(matches!(result, Err(ExportError::RendererUnavailable(name)) if name == "fake"));
        assert!(renderer.seen.borrow().is_empty());

        Ok(())
    }

    #[test]
    fn non_pdf_output_is_rejected() -> TestResult {
        let renderer = FakeRenderer::new(true, b"<html>");

        let result = export_pdf(&example_set()?, &context()?, &renderer);

        assert!(matches!(
            result,
            Err(ExportError::Render(RenderError::CorruptOutput))
        ));

        Ok(())
    }

    #[test]
    fn repeated_exports_are_identical() -> TestResult {
        let renderer = FakeRenderer::new(true, b"%PDF-1.7");
        let set = example_set()?;
        let context = context()?;

        let first = export_pdf(&set, &context, &renderer)?;
        let second = export_pdf(&set, &context, &renderer)?;

        assert_eq!(first, second);

        let seen = renderer.seen.borrow();

        assert_eq!(seen.first(), seen.get(1));

        Ok(())
    }
}
