//! Terminal Table
//!
//! Renders the dashboard for a terminal: summary cards, then the
//! recommendations table with the best material highlighted.

use std::{fmt::Write as _, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    dashboard::{Notice, SummaryCards},
    records::{Metric, PredictionRecord},
    result_set::ResultSet,
    statistics::{format_2dp, round_for_display},
};

/// Marker appended to values that were substituted with zero.
pub const COERCED_MARKER: &str = "*";

/// Footnote printed when any marker is shown.
pub const COERCED_FOOTNOTE: &str = "* value missing or non-numeric, shown as 0";

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Errors that can occur when writing to the terminal.
#[derive(Debug, Error)]
pub enum TableError {
    /// The output stream rejected a write.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Write summary cards followed by the recommendations table.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the output cannot be written.
pub fn write_dashboard(out: &mut impl io::Write, result_set: &ResultSet) -> Result<(), TableError> {
    write_summary_cards(out, &SummaryCards::from_result_set(result_set))?;
    write_recommendations(out, result_set)
}

/// Write a notice in place of the dashboard.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the output cannot be written.
pub fn write_notice(out: &mut impl io::Write, notice: Notice) -> Result<(), TableError> {
    writeln!(out, "\n {BOLD}{}{RESET}", notice.heading)?;
    writeln!(out, " {}\n", notice.text)?;

    Ok(())
}

/// Write the four summary cards as aligned label/value lines.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the output cannot be written.
pub fn write_summary_cards(
    out: &mut impl io::Write,
    cards: &SummaryCards,
) -> Result<(), TableError> {
    let lines: SmallVec<[(String, String); 4]> = cards
        .cards()
        .into_iter()
        .map(|card| {
            let value = if card.label.is_empty() {
                format!("{BOLD}{}{RESET}", card.value)
            } else {
                format!("{BOLD}{}{RESET}  {}", card.value, card.label)
            };

            (format!(" {}:", card.title), value)
        })
        .collect();

    let label_width = lines
        .iter()
        .map(|(label, _)| strip_ansi(label).chars().count())
        .max()
        .unwrap_or_default();

    writeln!(out)?;

    for (label, value) in &lines {
        write_summary_line(out, label, value, label_width)?;
    }

    Ok(())
}

/// Write the recommendations table, rank 1 first.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the output cannot be written.
pub fn write_recommendations(
    out: &mut impl io::Write,
    result_set: &ResultSet,
) -> Result<(), TableError> {
    let mut builder = Builder::default();
    let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

    builder.push_record(["Rank", "Material", "Cost", "CO2 (kg)", "Score"]);

    for (idx, record) in result_set.records().iter().enumerate() {
        // header is row 0
        let row = idx + 1;

        builder.push_record(record_cells(record));

        if record.rank == 1 {
            for col in 0..5 {
                color_ops.push((row, col, color_best()));
            }
        } else {
            for (col, metric) in metric_columns(record) {
                if metric.is_coerced() {
                    color_ops.push((row, col, color_dim()));
                }
            }
        }
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    writeln!(out, "\n{}", dim_borders(&table.to_string()))?;

    if result_set.coerced_fields() > 0 {
        writeln!(out, " {DIM}{COERCED_FOOTNOTE}{RESET}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn record_cells(record: &PredictionRecord) -> [String; 5] {
    [
        format!("#{}", record.rank),
        record.material.clone(),
        marked(format_cost(record.predicted_cost.value()), record.predicted_cost),
        marked(format_2dp(record.co2.value()), record.co2),
        marked(
            format_2dp(record.sustainability_score.value()),
            record.sustainability_score,
        ),
    ]
}

fn metric_columns(record: &PredictionRecord) -> [(usize, Metric); 3] {
    [
        (2, record.predicted_cost),
        (3, record.co2),
        (4, record.sustainability_score),
    ]
}

/// Format a cost in Indian rupees.
pub fn format_cost(value: Decimal) -> String {
    Money::from_decimal(round_for_display(value), iso::INR).to_string()
}

fn marked(text: String, metric: Metric) -> String {
    if metric.is_coerced() {
        format!("{text}{COERCED_MARKER}")
    } else {
        text
    }
}

fn is_border(ch: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&ch)
}

/// Dim each run of box-drawing characters in a rendered table.
fn dim_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut rest = table;

    while let Some(start) = rest.find(is_border) {
        let (plain, tail) = rest.split_at(start);
        let border_len = tail.find(|ch: char| !is_border(ch)).unwrap_or(tail.len());
        let (border, after) = tail.split_at(border_len);

        _ = write!(out, "{plain}{DIM}{border}{RESET}");
        rest = after;
    }

    out.push_str(rest);

    out
}

/// Remove ANSI escape sequences.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            in_escape = !ch.is_ascii_alphabetic();
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            out.push(ch);
        }
    }

    out
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
) -> Result<(), TableError> {
    let label_pad = label_col_width.saturating_sub(strip_ansi(label).chars().count());

    writeln!(out, "{:>label_pad$}{label}  {value}", "")?;

    Ok(())
}

fn color_dim() -> Color {
    Color::new(DIM, RESET)
}

/// Bold green for the best recommendation.
fn color_best() -> Color {
    Color::new("\x1b[1;32m", RESET)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::dashboard::NO_DATA_NOTICE;

    use super::*;

    fn example_set() -> TestResult<ResultSet> {
        let records = [
            json!({"rank": 1, "material": "Recycled Cardboard", "predicted_cost": 12.5, "co2": 0.8, "sustainability_score": 92}),
            json!({"rank": 2, "material": "Bubble Wrap", "predicted_cost": "n/a", "co2": 2.1, "sustainability_score": 61}),
        ]
        .iter()
        .map(PredictionRecord::from_json)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(ResultSet::new(records, None)?)
    }

    #[test]
    fn strip_ansi_keeps_only_visible_text() {
        assert_eq!(strip_ansi("\x1b[1mTotal:\x1b[0m"), "Total:");
        assert_eq!(strip_ansi("\x1b[1;32m#1\x1b[0m plain"), "#1 plain");
    }

    #[test]
    fn borders_are_dimmed_per_run() {
        assert_eq!(dim_borders("╭──╮ a"), "\x1b[90m╭──╮\x1b[0m a");
        assert_eq!(
            dim_borders("│ x │\n"),
            "\x1b[90m│\x1b[0m x \x1b[90m│\x1b[0m\n"
        );
        assert_eq!(dim_borders("no borders"), "no borders");
    }

    #[test]
    fn table_lists_records_in_rank_order() -> TestResult {
        let mut out = Vec::new();

        write_recommendations(&mut out, &example_set()?)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        let cardboard = text.find("Recycled Cardboard").ok_or("missing rank 1")?;
        let wrap = text.find("Bubble Wrap").ok_or("missing rank 2")?;

        assert!(cardboard < wrap);
        assert!(text.contains("12.50"));
        assert!(text.contains("92.00"));

        Ok(())
    }

    #[test]
    fn coerced_values_are_marked_with_footnote() -> TestResult {
        let mut out = Vec::new();

        write_recommendations(&mut out, &example_set()?)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        assert!(text.contains("0.00*"));
        assert!(text.contains(COERCED_FOOTNOTE));

        Ok(())
    }

    #[test]
    fn dashboard_starts_with_summary_cards() -> TestResult {
        let mut out = Vec::new();

        write_dashboard(&mut out, &example_set()?)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        assert!(text.contains(" Best Recommendation:  Recycled Cardboard  Sustainability: 92"));
        assert!(text.contains("Average Cost:  Rs.6.25  Across 2 materials"));
        assert!(text.contains("Out of 100"));

        Ok(())
    }

    #[test]
    fn notice_prints_heading_and_text() -> TestResult {
        let mut out = Vec::new();

        write_notice(&mut out, NO_DATA_NOTICE)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        assert!(text.contains("No Data Available"));
        assert!(text.contains("Please generate a recommendation first"));

        Ok(())
    }
}
