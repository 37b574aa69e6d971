use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use perf_ingest::{
    CsvDirInserter, DataInserter, DataPaths, Engine, EngineOptions, IngestReport, LogInserter,
};
use perf_model::SchemaRegistry;

use crate::cli::Cli;

/// Load the schema declaration, falling back to the builtin one.
pub fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = match path {
        Some(path) => SchemaRegistry::from_path(path)
            .with_context(|| format!("load schema {}", path.display()))?,
        None => SchemaRegistry::builtin().context("load builtin schema")?,
    };
    info!(
        identity = registry.identity_table(),
        tables = registry.table_names().len(),
        detail_columns = registry.detail_layout().len(),
        "schema loaded"
    );
    Ok(registry)
}

/// Run one ingestion as described by the command line.
///
/// Errors are startup failures only; per-file defects end up in the report.
pub fn run_ingest(cli: &Cli) -> Result<IngestReport> {
    let registry = Arc::new(load_registry(cli.schema.as_deref())?);

    let sink: Arc<dyn DataInserter> = match &cli.output_dir {
        Some(dir) => Arc::new(
            CsvDirInserter::create(dir, &registry)
                .with_context(|| format!("create output directory {}", dir.display()))?,
        ),
        None => Arc::new(LogInserter::new()),
    };

    let options = EngineOptions::default()
        .with_jobs(cli.jobs.get())
        .with_parallel_tables(cli.parallel_tables);
    let engine = Engine::new(registry, DataPaths::new(cli.data_dir.clone()), sink)
        .with_options(options)
        .context("configure ingestion engine")?;

    let span = info_span!("run", summaries = cli.summaries.len(), jobs = cli.jobs.get());
    let _guard = span.enter();
    let start = Instant::now();
    let report = engine.run(&cli.summaries);
    info!(
        elapsed_ms = start.elapsed().as_millis(),
        failures = report.all_failures().count(),
        "ingestion finished"
    );
    Ok(report)
}
