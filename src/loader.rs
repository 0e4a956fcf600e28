//! Loader
//!
//! Validates a stored prediction payload and turns it into a [`ResultSet`],
//! or into one of the two sentinels the dashboard knows how to show.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    records::{PredictionRecord, ProductInfo, RecordError},
    result_set::{ResultSet, ResultSetError},
    store::{ResultStore, StoreError},
};

/// Reasons a stored payload could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The payload is not JSON, or not a JSON object.
    #[error("payload is not a JSON object: {0}")]
    Malformed(String),

    /// `predictions` is present but is not an array.
    #[error("`predictions` must be an array")]
    PredictionsNotArray,

    /// A record failed schema validation.
    #[error("prediction {index} is invalid: {source}")]
    Record {
        /// Position of the record in the payload
        index: usize,
        /// What was wrong with it
        #[source]
        source: RecordError,
    },

    /// Record ranks do not form a valid ranking.
    #[error(transparent)]
    ResultSet(#[from] ResultSetError),

    /// The session store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of loading a stored payload.
#[derive(Debug)]
pub enum LoadOutcome {
    /// A valid, non-empty result set.
    Loaded(ResultSet),

    /// Nothing to show yet.
    Empty,

    /// The stored payload is unusable.
    Error(LoadError),
}

impl LoadOutcome {
    /// The loaded result set, if any.
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            LoadOutcome::Loaded(set) => Some(set),
            LoadOutcome::Empty | LoadOutcome::Error(_) => None,
        }
    }

    /// True for [`LoadOutcome::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, LoadOutcome::Empty)
    }

    /// True for [`LoadOutcome::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, LoadOutcome::Error(_))
    }
}

/// Load a result set from raw stored text.
///
/// Never fails: missing or empty predictions give [`LoadOutcome::Empty`],
/// anything unusable gives [`LoadOutcome::Error`].
pub fn load_result_set(raw: &str) -> LoadOutcome {
    if raw.trim().is_empty() {
        return LoadOutcome::Empty;
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(parse_error) => {
            error!("failed to parse stored payload: {parse_error}");

            return LoadOutcome::Error(LoadError::Malformed(parse_error.to_string()));
        }
    };

    match result_set_from_value(&value) {
        Ok(Some(set)) => {
            debug!(records = set.len(), "loaded result set");

            LoadOutcome::Loaded(set)
        }
        Ok(None) => LoadOutcome::Empty,
        Err(load_error) => {
            error!("stored payload failed validation: {load_error}");

            LoadOutcome::Error(load_error)
        }
    }
}

/// Load a result set through a [`ResultStore`].
pub fn load_from_store(store: &dyn ResultStore) -> LoadOutcome {
    match store.read() {
        Ok(Some(raw)) => load_result_set(&raw),
        Ok(None) => LoadOutcome::Empty,
        Err(store_error) => {
            error!("failed to read session store: {store_error}");

            LoadOutcome::Error(LoadError::Store(store_error))
        }
    }
}

/// Validate an already-parsed payload.
///
/// Returns `Ok(None)` when there is nothing to show.
///
/// # Errors
///
/// Returns a [`LoadError`] when the payload shape or record contents are invalid.
pub fn result_set_from_value(value: &Value) -> Result<Option<ResultSet>, LoadError> {
    let object = value
        .as_object()
        .ok_or_else(|| LoadError::Malformed(format!("expected an object, found {}", kind(value))))?;

    let predictions = match object.get("predictions") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) if items.is_empty() => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(LoadError::PredictionsNotArray),
    };

    let records = predictions
        .iter()
        .enumerate()
        .map(|(index, item)| {
            PredictionRecord::from_json(item).map_err(|source| LoadError::Record { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for record in &records {
        for field in record.coerced_fields() {
            warn!(
                rank = record.rank,
                field, "non-numeric value replaced with 0"
            );
        }
    }

    let product_info = object
        .get("product_info")
        .and_then(Value::as_object)
        .map(ProductInfo::from_json);

    Ok(Some(ResultSet::new(records, product_info)?))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{records::ProductField, store::MemoryStore};

    use super::*;

    const PAYLOAD: &str = r#"{
        "status": "success",
        "predictions": [
            {"rank": 1, "material": "Recycled Cardboard", "predicted_cost": 12.5, "co2": 0.8, "sustainability_score": 92},
            {"rank": 2, "material": "Bubble Wrap", "predicted_cost": 8.0, "co2": 2.1, "sustainability_score": 61}
        ],
        "product_info": {"product_name": "Phone", "category": "Electronics"}
    }"#;

    #[test]
    fn valid_payload_loads() -> TestResult {
        let outcome = load_result_set(PAYLOAD);
        let set = outcome.result_set().ok_or("expected a result set")?;

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.best().map(|r| r.material.as_str()),
            Some("Recycled Cardboard")
        );
        assert_eq!(
            set.product_info().map(|info| info.display(ProductField::Category)),
            Some("Electronics".to_string())
        );

        Ok(())
    }

    #[test]
    fn empty_predictions_give_empty_state() {
        assert!(load_result_set(r#"{"predictions": []}"#).is_empty());
    }

    #[test]
    fn missing_or_null_predictions_give_empty_state() {
        assert!(load_result_set(r#"{"product_info": {}}"#).is_empty());
        assert!(load_result_set(r#"{"predictions": null}"#).is_empty());
        assert!(load_result_set("   ").is_empty());
    }

    #[test]
    fn malformed_input_gives_error_state() {
        assert!(load_result_set("{not json").is_error());
        assert!(load_result_set("[1, 2, 3]").is_error());
        assert!(load_result_set(r#""predictions""#).is_error());
    }

    #[test]
    fn non_array_predictions_give_error_state() {
        let outcome = load_result_set(r#"{"predictions": {"rank": 1}}"#);

        assert!(matches!(
            outcome,
            LoadOutcome::Error(LoadError::PredictionsNotArray)
        ));
    }

    #[test]
    fn invalid_record_reports_its_index() {
        let outcome = load_result_set(
            r#"{"predictions": [{"rank": 1, "material": "Jute"}, {"rank": 2}]}"#,
        );

        assert!(matches!(
            outcome,
            LoadOutcome::Error(LoadError::Record {
                index: 1,
                source: RecordError::MissingMaterial
            })
        ));
    }

    #[test]
    fn broken_ranking_gives_error_state() {
        let outcome = load_result_set(
            r#"{"predictions": [{"rank": 2, "material": "Jute"}, {"rank": 2, "material": "Foam"}]}"#,
        );

        assert!(matches!(
            outcome,
            LoadOutcome::Error(LoadError::ResultSet(ResultSetError::InvalidRanks { .. }))
        ));
    }

    #[test]
    fn string_numbers_are_coerced_and_flagged() -> TestResult {
        let outcome = load_result_set(
            r#"{"predictions": [{"rank": 1, "material": "Jute", "predicted_cost": "4.20", "co2": "lots", "sustainability_score": "70"}]}"#,
        );

        let set = outcome.result_set().ok_or("expected a result set")?;
        let best = set.best().ok_or("expected a record")?;

        assert_eq!(best.predicted_cost.value(), Decimal::new(420, 2));
        assert_eq!(best.co2.value(), Decimal::ZERO);
        assert!(best.co2.is_coerced());
        assert_eq!(set.coerced_fields(), 1);

        Ok(())
    }

    #[test]
    fn non_object_product_info_is_ignored() -> TestResult {
        let outcome = load_result_set(
            r#"{"predictions": [{"rank": 1, "material": "Jute"}], "product_info": "Phone"}"#,
        );

        let set = outcome.result_set().ok_or("expected a result set")?;

        assert!(set.product_info().is_none());

        Ok(())
    }

    #[test]
    fn load_from_store_reads_through_the_store() -> TestResult {
        let mut store = MemoryStore::default();

        assert!(load_from_store(&store).is_empty());

        store.write(PAYLOAD)?;

        assert!(load_from_store(&store).result_set().is_some());

        Ok(())
    }
}
