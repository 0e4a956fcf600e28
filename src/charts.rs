//! Charts
//!
//! Chart-ready series derived from a [`ResultSet`], the colour gradient used to
//! shade bars, and the four chart definitions handed to the UI's chart library.

use std::fmt;

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use crate::result_set::ResultSet;

/// Alpha used for bar fills.
pub const FILL_ALPHA: f32 = 0.7;

/// Alpha used for bar borders.
pub const BORDER_ALPHA: f32 = 1.0;

/// Alpha used for the area under line series.
pub const AREA_ALPHA: f32 = 0.1;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |at: usize| {
            digits
                .get(at..at + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        };

        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// This colour with the given alpha.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba { rgb: self, alpha }
    }
}

/// A colour with transparency, rendered as a CSS `rgba()` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Colour channels
    pub rgb: Rgb,
    /// Opacity between 0 and 1
    pub alpha: f32,
}

impl Rgba {
    /// The border variant of this colour (fully opaque).
    pub fn border(self) -> Self {
        self.rgb.with_alpha(BORDER_ALPHA)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}

/// Shade each value between `start` and `end` by its position in the value range.
///
/// With `reverse` the highest value maps to `start`. When every value is equal,
/// or the spread is too wide for a `Decimal`, all colours are the midpoint
/// blend. Output uses the fill alpha.
pub fn color_for(values: &[Decimal], start: Rgb, end: Rgb, reverse: bool) -> Vec<Rgba> {
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };

    let half = Decimal::new(5, 1);

    // A range too wide to represent shades everything at the midpoint.
    let range = max.checked_sub(*min).filter(|range| !range.is_zero());

    values
        .iter()
        .map(|value| {
            let ratio = range
                .and_then(|range| {
                    value
                        .checked_sub(*min)
                        .and_then(|offset| offset.checked_div(range))
                })
                .unwrap_or(half);

            let ratio = if reverse { Decimal::ONE - ratio } else { ratio };

            Rgb::new(
                blend(start.r, end.r, ratio),
                blend(start.g, end.g, ratio),
                blend(start.b, end.b, ratio),
            )
            .with_alpha(FILL_ALPHA)
        })
        .collect()
}

fn blend(from: u8, to: u8, ratio: Decimal) -> u8 {
    let from_dec = Decimal::from(from);
    let channel = from_dec + ratio * (Decimal::from(to) - from_dec);

    channel
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .unwrap_or(from)
}

/// Parallel series for charting, in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    /// Material names
    pub labels: Vec<String>,
    /// Predicted costs
    pub cost_series: Vec<Decimal>,
    /// CO2 values
    pub co2_series: Vec<Decimal>,
    /// Sustainability scores
    pub score_series: Vec<Decimal>,
    /// Costs rescaled to 0..=100 against the highest cost
    pub normalized_cost_series: Vec<Decimal>,
    /// CO2 rescaled to 0..=100 against the highest CO2 value
    pub normalized_co2_series: Vec<Decimal>,
}

/// Build chart series without re-ordering records.
pub fn build_chart_series(result_set: &ResultSet) -> ChartSeries {
    let records = result_set.records();

    let labels = records.iter().map(|r| r.material.clone()).collect();
    let cost_series: Vec<_> = records.iter().map(|r| r.predicted_cost.value()).collect();
    let co2_series: Vec<_> = records.iter().map(|r| r.co2.value()).collect();
    let score_series = records
        .iter()
        .map(|r| r.sustainability_score.value())
        .collect();

    debug!(points = records.len(), "built chart series");

    ChartSeries {
        labels,
        normalized_cost_series: normalize(&cost_series),
        normalized_co2_series: normalize(&co2_series),
        cost_series,
        co2_series,
        score_series,
    }
}

/// Rescale values to percentages of the maximum.
///
/// A flat series (every value equal, including all zero) has no meaningful
/// scale and maps to all zeros, as does a series whose maximum is not positive.
pub fn normalize(values: &[Decimal]) -> Vec<Decimal> {
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };

    if min == max || *max <= Decimal::ZERO {
        return vec![Decimal::ZERO; values.len()];
    }

    values
        .iter()
        .map(|value| {
            value
                .checked_div(*max)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
                .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        })
        .collect()
}

/// Chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Bar chart
    Bar,
    /// Line chart
    Line,
}

/// Axis along which bars extend from their labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAxis {
    /// Vertical bars
    X,
    /// Horizontal bars
    Y,
}

/// Colour for a whole dataset or one per point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    /// One colour for every point
    Single(String),
    /// One colour per point
    PerPoint(Vec<String>),
}

/// One plotted dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Legend label
    pub label: String,
    /// Values in label order
    pub data: Vec<f64>,
    /// Fill colour(s)
    pub background_color: Paint,
    /// Border colour(s)
    pub border_color: Paint,
    /// Border width in pixels
    pub border_width: u8,
    /// Whether the area under a line is filled
    pub fill: bool,
    /// Line curve tension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

/// The value axis of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    /// Axis title
    pub title: String,
    /// Fixed upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A complete chart definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Canvas identifier in the page
    pub id: String,
    /// Chart type
    #[serde(rename = "type")]
    pub kind: ChartKind,
    /// Orientation
    pub index_axis: IndexAxis,
    /// Chart title
    pub title: String,
    /// Category labels
    pub labels: Vec<String>,
    /// Plotted datasets
    pub datasets: Vec<Dataset>,
    /// Value axis
    pub value_axis: ValueAxis,
    /// Whether to show the legend
    pub legend: bool,
}

const COST_LOW: Rgb = Rgb::new(0x4C, 0xAF, 0x50);
const COST_HIGH: Rgb = Rgb::new(0xFF, 0x57, 0x22);
const CO2_LOW: Rgb = Rgb::new(0x81, 0xC7, 0x84);
const CO2_HIGH: Rgb = Rgb::new(0xEF, 0x53, 0x50);
const SCORE_GOOD: Rgb = Rgb::new(0x51, 0xCF, 0x66);
const SCORE_POOR: Rgb = Rgb::new(0xFF, 0x6B, 0x6B);
const LINE_COST: Rgb = Rgb::new(0xFF, 0x63, 0x84);
const LINE_CO2: Rgb = Rgb::new(0x36, 0xA2, 0xEB);
const LINE_SCORE: Rgb = Rgb::new(0x4B, 0xC0, 0xC0);

/// The four dashboard charts: cost, CO2, sustainability ranking and combined.
pub fn chart_specs(series: &ChartSeries) -> [ChartSpec; 4] {
    [
        gradient_bar_chart(
            series,
            BarChart {
                id: "costChart",
                title: "Cost Comparison Across Materials",
                label: "Predicted Cost (Rs.)",
                axis_title: "Cost (Rs.)",
                values: &series.cost_series,
                colors: (COST_LOW, COST_HIGH, false),
                index_axis: IndexAxis::X,
                max: None,
            },
        ),
        gradient_bar_chart(
            series,
            BarChart {
                id: "co2Chart",
                title: "CO2 Impact Comparison",
                label: "CO2 Emissions (kg)",
                axis_title: "CO2 Emissions (kg)",
                values: &series.co2_series,
                colors: (CO2_LOW, CO2_HIGH, false),
                index_axis: IndexAxis::X,
                max: None,
            },
        ),
        gradient_bar_chart(
            series,
            BarChart {
                id: "sustainabilityChart",
                title: "Material Sustainability Ranking",
                label: "Sustainability Score",
                axis_title: "Sustainability Score",
                values: &series.score_series,
                colors: (SCORE_GOOD, SCORE_POOR, true),
                index_axis: IndexAxis::Y,
                max: Some(100.0),
            },
        ),
        ChartSpec {
            id: "combinedChart".to_string(),
            kind: ChartKind::Line,
            index_axis: IndexAxis::X,
            title: "Multi-Metric Comparison".to_string(),
            labels: series.labels.clone(),
            datasets: vec![
                line_dataset(
                    "Cost (normalized)",
                    &series.normalized_cost_series,
                    LINE_COST,
                ),
                line_dataset(
                    "CO2 Impact (normalized)",
                    &series.normalized_co2_series,
                    LINE_CO2,
                ),
                line_dataset("Sustainability Score", &series.score_series, LINE_SCORE),
            ],
            value_axis: ValueAxis {
                title: "Normalized Score (0-100)".to_string(),
                max: Some(100.0),
            },
            legend: true,
        },
    ]
}

struct BarChart<'a> {
    id: &'a str,
    title: &'a str,
    label: &'a str,
    axis_title: &'a str,
    values: &'a [Decimal],
    colors: (Rgb, Rgb, bool),
    index_axis: IndexAxis,
    max: Option<f64>,
}

fn gradient_bar_chart(series: &ChartSeries, chart: BarChart<'_>) -> ChartSpec {
    let (start, end, reverse) = chart.colors;
    let fills = color_for(chart.values, start, end, reverse);

    ChartSpec {
        id: chart.id.to_string(),
        kind: ChartKind::Bar,
        index_axis: chart.index_axis,
        title: chart.title.to_string(),
        labels: series.labels.clone(),
        datasets: vec![Dataset {
            label: chart.label.to_string(),
            data: to_points(chart.values),
            background_color: Paint::PerPoint(fills.iter().map(ToString::to_string).collect()),
            border_color: Paint::PerPoint(
                fills
                    .iter()
                    .map(|color| color.border().to_string())
                    .collect(),
            ),
            border_width: 2,
            fill: false,
            tension: None,
        }],
        value_axis: ValueAxis {
            title: chart.axis_title.to_string(),
            max: chart.max,
        },
        legend: false,
    }
}

fn line_dataset(label: &str, values: &[Decimal], color: Rgb) -> Dataset {
    Dataset {
        label: label.to_string(),
        data: to_points(values),
        background_color: Paint::Single(color.with_alpha(AREA_ALPHA).to_string()),
        border_color: Paint::Single(color.with_alpha(BORDER_ALPHA).to_string()),
        border_width: 2,
        fill: true,
        tension: Some(0.4),
    }
}

fn to_points(values: &[Decimal]) -> Vec<f64> {
    values
        .iter()
        .map(|value| value.to_f64().unwrap_or_default())
        .collect()
}
