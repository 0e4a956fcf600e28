//! Records
//!
//! Typed forms of the rows returned by the prediction service and of the
//! product description that produced them.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

/// Sentinel shown wherever a product field is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Errors raised while building a [`PredictionRecord`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,

    /// The record has no `rank` field.
    #[error("record has no rank")]
    MissingRank,

    /// The `rank` field is not a positive integer.
    #[error("invalid rank: {0}")]
    InvalidRank(String),

    /// The `material` field is missing or blank.
    #[error("record has no material name")]
    MissingMaterial,
}

/// A numeric field that tolerates malformed input.
///
/// Values that cannot be read as a decimal are replaced with zero and
/// remember that the substitution happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metric {
    value: Decimal,
    coerced: bool,
}

impl Metric {
    /// A metric holding a value read without substitution.
    pub fn new(value: Decimal) -> Self {
        Self {
            value,
            coerced: false,
        }
    }

    /// A zero that stands in for an unreadable value.
    pub fn substituted() -> Self {
        Self {
            value: Decimal::ZERO,
            coerced: true,
        }
    }

    /// Read a metric from an optional JSON value.
    pub fn from_json(value: Option<&Value>) -> Self {
        value
            .and_then(decimal_from_json)
            .map_or_else(Self::substituted, Self::new)
    }

    /// The decimal value (zero when substituted).
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Whether the value was substituted with zero.
    pub fn is_coerced(&self) -> bool {
        self.coerced
    }
}

impl From<Decimal> for Metric {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Parse decimal text, accepting plain and scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    Decimal::from_str(text)
        .or_else(|_err| Decimal::from_scientific(text))
        .ok()
}

fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

/// One recommended packaging material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    /// Position in the ranking, 1 is best.
    pub rank: u32,

    /// Display name of the material.
    pub material: String,

    /// Predicted cost in rupees.
    pub predicted_cost: Metric,

    /// Predicted emissions in kg CO2-equivalent.
    pub co2: Metric,

    /// Sustainability score out of 100.
    pub sustainability_score: Metric,
}

impl PredictionRecord {
    /// Create a record from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidRank`] for a zero rank and
    /// [`RecordError::MissingMaterial`] for a blank material name.
    pub fn new(
        rank: u32,
        material: impl Into<String>,
        predicted_cost: impl Into<Metric>,
        co2: impl Into<Metric>,
        sustainability_score: impl Into<Metric>,
    ) -> Result<Self, RecordError> {
        if rank == 0 {
            return Err(RecordError::InvalidRank(rank.to_string()));
        }

        let material = material.into().trim().to_string();

        if material.is_empty() {
            return Err(RecordError::MissingMaterial);
        }

        Ok(Self {
            rank,
            material,
            predicted_cost: predicted_cost.into(),
            co2: co2.into(),
            sustainability_score: sustainability_score.into(),
        })
    }

    /// Read a record from one element of the `predictions` array.
    ///
    /// Numeric fields are coerced; rank and material are required.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] when the element is not an object or lacks a
    /// usable rank or material.
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;

        let rank = rank_from_json(object.get("rank").ok_or(RecordError::MissingRank)?)?;

        let material = match object.get("material") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(RecordError::MissingMaterial),
        };

        Self::new(
            rank,
            material,
            Metric::from_json(object.get("predicted_cost")),
            Metric::from_json(object.get("co2")),
            Metric::from_json(object.get("sustainability_score")),
        )
    }

    /// Names of the metric fields that were substituted with zero.
    pub fn coerced_fields(&self) -> impl Iterator<Item = &'static str> {
        [
            ("predicted_cost", self.predicted_cost),
            ("co2", self.co2),
            ("sustainability_score", self.sustainability_score),
        ]
        .into_iter()
        .filter(|(_, metric)| metric.is_coerced())
        .map(|(name, _)| name)
    }
}

fn rank_from_json(value: &Value) -> Result<u32, RecordError> {
    let rank = match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };

    match rank {
        Some(rank) if rank > 0 => Ok(rank),
        _ => Err(RecordError::InvalidRank(value.to_string())),
    }
}

/// Fields of the product description, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    /// Product name
    Name,
    /// Product weight in kilograms
    WeightKg,
    /// Product category
    Category,
    /// Fragility between 0 and 1
    FragilityIndex,
    /// Shipping mode
    ShippingType,
}

impl ProductField {
    /// Every field in display order.
    pub const ALL: [ProductField; 5] = [
        ProductField::Name,
        ProductField::WeightKg,
        ProductField::Category,
        ProductField::FragilityIndex,
        ProductField::ShippingType,
    ];
}

/// The product description submitted with the prediction request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product name
    pub product_name: Option<String>,

    /// Product weight in kilograms
    pub product_weight_kg: Option<Decimal>,

    /// Product category
    pub category: Option<String>,

    /// Fragility between 0 and 1
    pub fragility_index: Option<Decimal>,

    /// Shipping mode
    pub shipping_type: Option<String>,
}

impl ProductInfo {
    /// Read the product description. Unusable fields become absent.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        Self {
            product_name: text_from_json(object.get("product_name")),
            product_weight_kg: object.get("product_weight_kg").and_then(decimal_from_json),
            category: text_from_json(object.get("category")),
            fragility_index: object.get("fragility_index").and_then(decimal_from_json),
            shipping_type: text_from_json(object.get("shipping_type")),
        }
    }

    /// Display text for a field, or [`NOT_AVAILABLE`] when absent.
    pub fn display(&self, field: ProductField) -> String {
        let value = match field {
            ProductField::Name => self.product_name.clone(),
            ProductField::WeightKg => self.product_weight_kg.map(|w| w.to_string()),
            ProductField::Category => self.category.clone(),
            ProductField::FragilityIndex => self.fragility_index.map(|f| f.to_string()),
            ProductField::ShippingType => self.shipping_type.clone(),
        };

        value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn text_from_json(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
