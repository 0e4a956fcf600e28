//! `EcoPackAI` Report prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    charts::{ChartSeries, ChartSpec, Rgb, Rgba, build_chart_series, chart_specs, color_for},
    dashboard::{Dashboard, DashboardState, SummaryCards},
    export::{
        DocumentRenderer, ExportArtifact, ExportContext, ExportError, ExportFormat, RenderError,
        ReportDocument, TypstCompiler, export_csv, export_pdf, parse_csv_recommendations,
    },
    loader::{LoadError, LoadOutcome, load_from_store, load_result_set},
    records::{Metric, PredictionRecord, ProductInfo, RecordError},
    result_set::{ResultSet, ResultSetError},
    statistics::{DerivedStatistics, compute_statistics},
    store::{FileStore, MemoryStore, ResultStore, StoreError},
};
