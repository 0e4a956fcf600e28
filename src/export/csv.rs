//! CSV report
//!
//! A human-readable report whose middle section is a comma-separated table.
//! Material names are wrapped in quotes so embedded commas survive, but quote
//! characters inside names are written as-is, so spreadsheet tools will
//! misread such rows.

use std::fmt::Write;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::error;

use crate::{
    export::{ExportArtifact, ExportContext, ExportError, ExportFormat},
    records::{ProductField, parse_decimal},
    result_set::ResultSet,
    statistics::{compute_statistics, format_2dp},
};

/// Header row of the recommendations table.
pub const TABLE_HEADER: &str =
    "Rank,Material,Predicted Cost (Rs.),CO2 Impact (kg),Sustainability Score";

/// Serialise a result set as a CSV report.
///
/// # Errors
///
/// Returns [`ExportError::Format`] if the text cannot be assembled.
pub fn export_csv(
    result_set: &ResultSet,
    context: &ExportContext,
) -> Result<ExportArtifact, ExportError> {
    let text = render_csv(result_set, context).map_err(|source| {
        error!("CSV serialisation failed: {source}");

        ExportError::Format {
            format: ExportFormat::Csv,
            source,
        }
    })?;

    Ok(ExportArtifact {
        format: ExportFormat::Csv,
        filename: context.filename(ExportFormat::Csv),
        bytes: text.into_bytes(),
    })
}

/// Build the CSV report text.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn render_csv(result_set: &ResultSet, context: &ExportContext) -> Result<String, std::fmt::Error> {
    let info = result_set.product_info_or_default();
    let stats = compute_statistics(result_set);
    let mut out = String::new();

    writeln!(out, "EcoPackAI Sustainability Report")?;
    writeln!(out)?;
    writeln!(out, "Product Information")?;
    writeln!(out, "Product Name,{}", info.display(ProductField::Name))?;
    writeln!(out, "Weight (kg),{}", info.display(ProductField::WeightKg))?;
    writeln!(out, "Category,{}", info.display(ProductField::Category))?;
    writeln!(out, "Fragility Index,{}", info.display(ProductField::FragilityIndex))?;
    writeln!(out, "Shipping Type,{}", info.display(ProductField::ShippingType))?;
    writeln!(out)?;
    writeln!(out, "Generated,{}", context.generated_label())?;
    writeln!(out)?;

    writeln!(out, "Material Recommendations")?;
    writeln!(out, "{TABLE_HEADER}")?;

    for record in result_set.records() {
        writeln!(
            out,
            "{},\"{}\",{},{},{}",
            record.rank,
            record.material,
            record.predicted_cost,
            record.co2,
            record.sustainability_score
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Statistics")?;
    writeln!(out, "Average Cost (Rs.),{}", format_2dp(stats.avg_cost))?;
    writeln!(out, "Average CO2 Impact (kg),{}", format_2dp(stats.avg_co2))?;
    writeln!(
        out,
        "Average Sustainability Score,{}",
        format_2dp(stats.avg_sustainability)
    )?;

    Ok(out)
}

/// One row read back from the recommendations table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// Rank
    pub rank: u32,
    /// Material name
    pub material: String,
    /// Predicted cost
    pub predicted_cost: Decimal,
    /// CO2
    pub co2: Decimal,
    /// Sustainability score
    pub sustainability_score: Decimal,
}

/// A table row that could not be read back.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unreadable recommendation row {line}: {text}")]
pub struct CsvParseError {
    /// One-based line number in the report
    pub line: usize,
    /// Offending line
    pub text: String,
}

/// Read the recommendations table back out of a CSV report.
///
/// Rows run from the line after [`TABLE_HEADER`] to the next blank line.
///
/// # Errors
///
/// Returns a [`CsvParseError`] for the first row that does not have the
/// `rank,"material",cost,co2,score` shape.
pub fn parse_csv_recommendations(text: &str) -> Result<Vec<CsvRow>, CsvParseError> {
    text.lines()
        .enumerate()
        .skip_while(|(_, line)| *line != TABLE_HEADER)
        .skip(1)
        .take_while(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_row(line).ok_or_else(|| CsvParseError {
                line: idx + 1,
                text: line.to_string(),
            })
        })
        .collect()
}

fn parse_row(line: &str) -> Option<CsvRow> {
    let (rank, rest) = line.split_once(',')?;

    let mut tail = rest.rsplitn(4, ',');
    let sustainability_score = parse_decimal(tail.next()?)?;
    let co2 = parse_decimal(tail.next()?)?;
    let predicted_cost = parse_decimal(tail.next()?)?;
    let quoted = tail.next()?;

    let material = quoted.strip_prefix('"')?.strip_suffix('"')?;

    Some(CsvRow {
        rank: rank.trim().parse().ok()?,
        material: material.to_string(),
        predicted_cost,
        co2,
        sustainability_score,
    })
}
