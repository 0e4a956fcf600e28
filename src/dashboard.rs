//! Dashboard
//!
//! Application state for the report views. A dashboard is either waiting for
//! data, showing a load failure, or ready with a [`ResultSet`]; every view and
//! export is derived from that state.

use crate::{
    charts::{ChartSeries, ChartSpec, build_chart_series, chart_specs},
    export::{
        DocumentRenderer, ExportArtifact, ExportContext, ExportError, ExportFormat, export_csv,
        export_pdf,
    },
    loader::{LoadError, LoadOutcome, load_from_store},
    result_set::ResultSet,
    statistics::{compute_statistics, format_2dp},
    store::ResultStore,
};

/// A heading plus an explanation, shown instead of the report views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    /// Short heading
    pub heading: &'static str,
    /// Plain-language explanation
    pub text: &'static str,
}

/// Shown when no predictions have been stored yet.
pub const NO_DATA_NOTICE: Notice = Notice {
    heading: "No Data Available",
    text: "Please generate a recommendation first to view analytics.",
};

/// Shown when the stored payload cannot be loaded.
pub const LOAD_ERROR_NOTICE: Notice = Notice {
    heading: "Error Loading Data",
    text: "There was a problem loading your analytics data.",
};

/// What the dashboard currently shows.
#[derive(Debug)]
pub enum DashboardState {
    /// No predictions stored.
    Empty,

    /// The stored payload is unusable.
    Error(LoadError),

    /// Views and exports are available.
    Ready(ResultSet),
}

impl From<LoadOutcome> for DashboardState {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded(set) => DashboardState::Ready(set),
            LoadOutcome::Empty => DashboardState::Empty,
            LoadOutcome::Error(load_error) => DashboardState::Error(load_error),
        }
    }
}

/// One summary card: a title, a headline value and a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    /// Card title
    pub title: &'static str,
    /// Headline value
    pub value: String,
    /// Caption under the value
    pub label: String,
}

/// The four headline cards above the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCards {
    /// Rank-1 material and its score
    pub best: SummaryCard,
    /// Average predicted cost
    pub cost: SummaryCard,
    /// Average CO2
    pub co2: SummaryCard,
    /// Average sustainability score
    pub sustainability: SummaryCard,
}

impl SummaryCards {
    /// Build the cards for a result set.
    pub fn from_result_set(result_set: &ResultSet) -> Self {
        let stats = compute_statistics(result_set);

        let best = result_set.best().map_or_else(
            || SummaryCard {
                title: "Best Recommendation",
                value: String::new(),
                label: String::new(),
            },
            |record| SummaryCard {
                title: "Best Recommendation",
                value: record.material.clone(),
                label: format!("Sustainability: {}", record.sustainability_score),
            },
        );

        Self {
            best,
            cost: SummaryCard {
                title: "Average Cost",
                value: format!("Rs.{}", format_2dp(stats.avg_cost)),
                label: format!("Across {} materials", stats.count),
            },
            co2: SummaryCard {
                title: "Average CO2 Impact",
                value: format_2dp(stats.avg_co2),
                label: "kg CO2 equivalent".to_string(),
            },
            sustainability: SummaryCard {
                title: "Avg Sustainability",
                value: format_2dp(stats.avg_sustainability),
                label: "Out of 100".to_string(),
            },
        }
    }

    /// Cards in display order.
    pub fn cards(&self) -> [&SummaryCard; 4] {
        [&self.best, &self.cost, &self.co2, &self.sustainability]
    }
}

/// The report dashboard.
#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
}

impl Dashboard {
    /// Load the dashboard from a session store.
    pub fn load(store: &dyn ResultStore) -> Self {
        Self::from_outcome(load_from_store(store))
    }

    /// Wrap an already computed load outcome.
    pub fn from_outcome(outcome: LoadOutcome) -> Self {
        Self {
            state: outcome.into(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// The loaded result set, when ready.
    pub fn result_set(&self) -> Option<&ResultSet> {
        match &self.state {
            DashboardState::Ready(set) => Some(set),
            DashboardState::Empty | DashboardState::Error(_) => None,
        }
    }

    /// The message to show in place of the views, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self.state {
            DashboardState::Ready(_) => None,
            DashboardState::Empty => Some(NO_DATA_NOTICE),
            DashboardState::Error(_) => Some(LOAD_ERROR_NOTICE),
        }
    }

    /// Whether the export actions are enabled.
    pub fn can_export(&self) -> bool {
        self.result_set().is_some()
    }

    /// Summary cards, when ready.
    pub fn summary(&self) -> Option<SummaryCards> {
        self.result_set().map(SummaryCards::from_result_set)
    }

    /// Chart series, when ready.
    pub fn series(&self) -> Option<ChartSeries> {
        self.result_set().map(build_chart_series)
    }

    /// Chart definitions, when ready.
    pub fn charts(&self) -> Option<[ChartSpec; 4]> {
        self.series().as_ref().map(chart_specs)
    }

    /// Export the CSV report.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoData`] when nothing is loaded, otherwise
    /// whatever [`export_csv`] returns.
    pub fn export_csv(&self, context: &ExportContext) -> Result<ExportArtifact, ExportError> {
        let set = self
            .result_set()
            .ok_or(ExportError::NoData(ExportFormat::Csv))?;

        export_csv(set, context)
    }

    /// Export the PDF report.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoData`] when nothing is loaded, otherwise
    /// whatever [`export_pdf`] returns.
    pub fn export_pdf(
        &self,
        context: &ExportContext,
        renderer: &dyn DocumentRenderer,
    ) -> Result<ExportArtifact, ExportError> {
        let set = self
            .result_set()
            .ok_or(ExportError::NoData(ExportFormat::Pdf))?;

        export_pdf(set, context, renderer)
    }

    /// Export in the given format.
    ///
    /// # Errors
    ///
    /// See [`Dashboard::export_csv`] and [`Dashboard::export_pdf`].
    pub fn export(
        &self,
        format: ExportFormat,
        context: &ExportContext,
        renderer: &dyn DocumentRenderer,
    ) -> Result<ExportArtifact, ExportError> {
        match format {
            ExportFormat::Csv => self.export_csv(context),
            ExportFormat::Pdf => self.export_pdf(context, renderer),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{export::TypstCompiler, store::MemoryStore};

    use super::*;

    const PAYLOAD: &str = r#"{
        "predictions": [
            {"rank": 1, "material": "Recycled Cardboard", "predicted_cost": 12.5, "co2": 0.8, "sustainability_score": 92},
            {"rank": 2, "material": "Bubble Wrap", "predicted_cost": 8.0, "co2": 2.1, "sustainability_score": 61}
        ]
    }"#;

    #[test]
    fn ready_dashboard_builds_summary_cards() -> TestResult {
        let dashboard = Dashboard::load(&MemoryStore::with_payload(PAYLOAD));

        let cards = dashboard.summary().ok_or("dashboard should be ready")?;

        assert_eq!(cards.best.value, "Recycled Cardboard");
        assert_eq!(cards.best.label, "Sustainability: 92");
        assert_eq!(cards.cost.value, "Rs.10.25");
        assert_eq!(cards.cost.label, "Across 2 materials");
        assert_eq!(cards.co2.value, "1.45");
        assert_eq!(cards.sustainability.value, "76.50");
        assert_eq!(
            cards.cards().map(|card| card.title),
            [
                "Best Recommendation",
                "Average Cost",
                "Average CO2 Impact",
                "Avg Sustainability"
            ]
        );
        assert!(dashboard.notice().is_none());
        assert!(dashboard.can_export());

        Ok(())
    }

    #[test]
    fn empty_store_shows_no_data_notice() {
        let dashboard = Dashboard::load(&MemoryStore::default());

        assert!(matches!(dashboard.state(), DashboardState::Empty));
        assert_eq!(dashboard.notice(), Some(NO_DATA_NOTICE));
        assert!(dashboard.summary().is_none());
        assert!(dashboard.charts().is_none());
        assert!(!dashboard.can_export());
    }

    #[test]
    fn malformed_payload_shows_error_notice() {
        let dashboard = Dashboard::load(&MemoryStore::with_payload("{not json"));

        assert!(matches!(dashboard.state(), DashboardState::Error(_)));
        assert_eq!(dashboard.notice(), Some(LOAD_ERROR_NOTICE));
    }

    #[test]
    fn exports_without_data_name_the_operation() {
        let dashboard = Dashboard::load(&MemoryStore::default());
        let context = ExportContext::now();

        assert!(matches!(
            dashboard.export_csv(&context),
            Err(ExportError::NoData(ExportFormat::Csv))
        ));
        assert!(matches!(
            dashboard.export(ExportFormat::Pdf, &context, &TypstCompiler::default()),
            Err(ExportError::NoData(ExportFormat::Pdf))
        ));
    }

    #[test]
    fn ready_dashboard_exports_csv() -> TestResult {
        let dashboard = Dashboard::load(&MemoryStore::with_payload(PAYLOAD));

        let artifact = dashboard.export_csv(&ExportContext::now())?;

        assert_eq!(artifact.format, ExportFormat::Csv);
        assert!(artifact.filename.ends_with(".csv"));

        let charts = dashboard.charts().ok_or("charts should be available")?;

        assert_eq!(charts.len(), 4);

        Ok(())
    }
}
