//! `EcoPackAI` report CLI

use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use ecopack_report::{
    config::{Command, Config},
    dashboard::Dashboard,
    export::{ExportContext, ExportError, ExportFormat, TypstCompiler},
    loader::load_result_set,
    logging::{self, LoggingError},
    store::{FileStore, ResultStore, StoreError},
    table::{self, TableError},
};
use thiserror::Error;
use tracing::info;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to read payload from {}: {source}", path.display())]
    ReadPayload {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to serialise charts: {0}")]
    Charts(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[expect(
    clippy::print_stderr,
    reason = "the CLI reports fatal errors on standard error"
)]
fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    match logging::init_subscriber(&config.logging)
        .map_err(CliError::from)
        .and_then(|()| run(config))
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), CliError> {
    let mut store = FileStore::new(&config.store);

    match config.command {
        Command::Store { input } => store_payload(&mut store, &input),
        Command::Show => show(&store),
        Command::Charts => charts(&store),
        Command::Export { format } => export(&store, format, &config.export_dir, &config.typst_bin),
        Command::Clear => store.clear().map_err(CliError::from),
    }
}

fn read_payload(input: &Path) -> Result<String, CliError> {
    let read_error = |source| CliError::ReadPayload {
        path: input.to_path_buf(),
        source,
    };

    if input == Path::new("-") {
        let mut raw = String::new();

        io::stdin().read_to_string(&mut raw).map_err(read_error)?;

        Ok(raw)
    } else {
        fs::read_to_string(input).map_err(read_error)
    }
}

fn store_payload(store: &mut FileStore, input: &Path) -> Result<(), CliError> {
    let raw = read_payload(input)?;

    store.write(&raw)?;

    match load_result_set(&raw).result_set() {
        Some(set) => info!(records = set.len(), path = %store.path().display(), "stored session"),
        None => info!(path = %store.path().display(), "stored session has nothing to report"),
    }

    Ok(())
}

fn show(store: &FileStore) -> Result<(), CliError> {
    let dashboard = Dashboard::load(store);
    let mut out = io::stdout().lock();

    match (dashboard.result_set(), dashboard.notice()) {
        (Some(set), _) => table::write_dashboard(&mut out, set)?,
        (None, Some(notice)) => table::write_notice(&mut out, notice)?,
        (None, None) => {}
    }

    Ok(())
}

fn charts(store: &FileStore) -> Result<(), CliError> {
    let dashboard = Dashboard::load(store);
    let mut out = io::stdout().lock();

    let Some(specs) = dashboard.charts() else {
        if let Some(notice) = dashboard.notice() {
            table::write_notice(&mut out, notice)?;
        }

        return Ok(());
    };

    let json = serde_json::to_string_pretty(&specs)?;

    writeln!(out, "{json}")?;

    Ok(())
}

fn export(
    store: &FileStore,
    format: ExportFormat,
    export_dir: &Path,
    typst_bin: &Path,
) -> Result<(), CliError> {
    let dashboard = Dashboard::load(store);
    let renderer = TypstCompiler::new(typst_bin);

    let artifact = dashboard.export(format, &ExportContext::now(), &renderer)?;
    let path = artifact.write_into(export_dir)?;

    let mut out = io::stdout().lock();

    writeln!(out, "{} ({})", format.success_message(), path.display())?;

    Ok(())
}
