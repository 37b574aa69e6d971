//! Summary-driven ingestion.
//!
//! For every summary file the engine reads one entity identifier per record,
//! opens that entity's detail file and, for each detail record, validates it
//! once and fans it out into one tuple per destination table. Failures are
//! isolated at the smallest enclosing unit (summary file, detail file,
//! record, table) and collected in the returned reports.

use std::ffi::OsStr;
use std::sync::Arc;

use perf_model::{InvalidColumnSet, SchemaError, SchemaRegistry};
use perf_validate::Validator;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::derive::{CoercionIssue, DerivedTuple, derive_tuple};
use crate::error::{DispatchError, IngestError, Result};
use crate::paths::DataPaths;
use crate::reader::{CsvSource, Dialect, HeaderMap, RawRecord};
use crate::report::{EntityReport, Failure, FailureKind, IngestReport, SummaryReport};
use crate::sink::DataInserter;

/// Tuning knobs for an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Detail files processed concurrently per summary file. `1` streams
    /// entities sequentially.
    pub jobs: usize,
    /// Dispatch the tables of one record concurrently.
    pub parallel_tables: bool,
    pub dialect: Dialect,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            parallel_tables: false,
            dialect: Dialect::default(),
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    #[must_use]
    pub fn with_parallel_tables(mut self, parallel_tables: bool) -> Self {
        self.parallel_tables = parallel_tables;
        self
    }
}

/// Result of deriving and dispatching one record into one table.
#[derive(Debug)]
pub struct TableOutcome {
    pub table: String,
    pub issues: Vec<CoercionIssue>,
    pub null_fields: usize,
    pub error: Option<DispatchError>,
}

impl TableOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The ingestion engine.
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    paths: DataPaths,
    sink: Arc<dyn DataInserter>,
    options: EngineOptions,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("paths", &self.paths)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        paths: DataPaths,
        sink: Arc<dyn DataInserter>,
    ) -> Self {
        Self {
            registry,
            paths,
            sink,
            options: EngineOptions::default(),
            pool: None,
        }
    }

    /// Apply `options`, building a dedicated worker pool when `jobs > 1`.
    pub fn with_options(mut self, options: EngineOptions) -> Result<Self> {
        self.pool = if options.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.jobs)
                .thread_name(|idx| format!("perf-worker-{idx}"))
                .build()?;
            Some(pool)
        } else {
            None
        };
        self.options = options;
        Ok(self)
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Process summary files in order, then flush the sink.
    pub fn run<I, S>(&self, summaries: I) -> IngestReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut report = IngestReport::default();
        for name in summaries {
            report.summaries.push(self.parse_summary(name));
        }
        if let Err(err) = self.sink.flush() {
            warn!(error = %err, "sink flush failed");
            report.failures.push(Failure::new(FailureKind::Flush, err));
        }
        info!(
            summaries = report.summary_files(),
            entities = report.entity_count(),
            records = report.detail_records(),
            dispatched = report.tuples_dispatched(),
            "run complete"
        );
        report
    }

    /// Process one summary file: every record names an entity whose detail
    /// file is ingested.
    pub fn parse_summary(&self, name: impl AsRef<OsStr>) -> SummaryReport {
        let name = name.as_ref();
        let path = self.paths.summary_path(name);
        let span = info_span!("summary", file = %path.display());
        let _guard = span.enter();

        let mut report = SummaryReport::new(name.to_string_lossy(), &path);
        let mut source = match CsvSource::open(&path, &self.options.dialect) {
            Ok(source) => source,
            Err(err) => {
                warn!(error = %err, "skipping summary file");
                report
                    .failures
                    .push(Failure::new(FailureKind::SummaryFile, err));
                return report;
            }
        };
        report.opened = true;

        let validator = Validator::new(&self.registry);
        let mut pending = Vec::new();
        for item in source.records() {
            let record = match item {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "skipping summary record");
                    report.failures.push(Failure::new(FailureKind::Record, err));
                    continue;
                }
            };
            let invalid = validator.summary(record.iter());
            let Some(identifier) = entity_identifier(&record, &invalid) else {
                let err = IngestError::MissingIdentifier {
                    path: path.clone(),
                    line: record.line(),
                };
                warn!(error = %err, "skipping summary record");
                report
                    .failures
                    .push(Failure::new(FailureKind::Identifier, err));
                continue;
            };

            if self.pool.is_some() {
                pending.push(identifier.to_string());
            } else {
                report.entities.push(self.parse_performance(identifier));
            }
        }

        if let Some(pool) = &self.pool {
            debug!(entities = pending.len(), jobs = self.options.jobs, "dispatching to worker pool");
            report.entities = pool.install(|| {
                pending
                    .par_iter()
                    .map(|identifier| self.parse_performance(identifier))
                    .collect()
            });
        }

        info!(entities = report.entities.len(), "summary file done");
        report
    }

    /// Ingest the detail file of one entity.
    pub fn parse_performance(&self, identifier: &str) -> EntityReport {
        let path = self.paths.detail_path(identifier);
        let span = info_span!("entity", id = identifier);
        let _guard = span.enter();

        let mut report = EntityReport::new(identifier, &path);
        let mut source = match CsvSource::open(&path, &self.options.dialect) {
            Ok(source) => source,
            Err(err) => {
                warn!(error = %err, "skipping detail file");
                report.abort(Failure::new(FailureKind::DetailFile, err));
                return report;
            }
        };

        let missing = source
            .header_map()
            .missing(self.registry.referenced_detail_headers());
        if !missing.is_empty() {
            let err = IngestError::UnresolvedHeaders {
                path: path.clone(),
                missing,
            };
            warn!(error = %err, "skipping detail file");
            report.abort(Failure::new(FailureKind::DetailFile, err));
            return report;
        }
        self.check_header_order(source.header_map());

        let headers = source.header_map().clone();
        let validator = Validator::new(&self.registry);
        for item in source.records() {
            let record = match item {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "skipping detail record");
                    report.malformed_records += 1;
                    report.failures.push(Failure::new(FailureKind::Record, err));
                    continue;
                }
            };
            report.records += 1;

            let validation = validator.detail_with_headers(record.iter(), headers.headers());
            report.invalid_columns += validation.invalid.len();

            let outcomes = self.dispatch_record(&record, &validation.invalid, &headers);
            if let Some(err) = tally_outcomes(&mut report, record.line(), outcomes) {
                warn!(line = record.line(), error = %err, "abandoning detail file");
                report.abort(Failure::new(
                    FailureKind::Schema,
                    format!("line {}: {err}", record.line()),
                ));
                break;
            }
        }

        debug!(
            records = report.records,
            dispatched = report.tuples_dispatched(),
            "detail file done"
        );
        report
    }

    /// Fan one validated record out to every destination table.
    ///
    /// Outcomes are returned in registry order whether or not tables are
    /// dispatched concurrently.
    pub fn dispatch_record(
        &self,
        record: &RawRecord,
        invalid: &InvalidColumnSet,
        headers: &HeaderMap,
    ) -> Vec<TableOutcome> {
        let tables = self.registry.table_names();
        if self.options.parallel_tables {
            tables
                .par_iter()
                .map(|table| self.derive_and_dispatch(record, table, invalid, headers))
                .collect()
        } else {
            tables
                .iter()
                .map(|table| self.derive_and_dispatch(record, table, invalid, headers))
                .collect()
        }
    }

    /// Derive the tuple for `table` and hand it to the sink.
    pub fn derive_and_dispatch(
        &self,
        record: &RawRecord,
        table: &str,
        invalid: &InvalidColumnSet,
        headers: &HeaderMap,
    ) -> TableOutcome {
        let schema = match self.registry.schema_for(table) {
            Ok(schema) => schema,
            Err(err) => {
                warn!(table, error = %err, "no schema for destination table");
                return TableOutcome {
                    table: table.to_string(),
                    issues: Vec::new(),
                    null_fields: 0,
                    error: Some(err.into()),
                };
            }
        };

        let DerivedTuple { tuple, issues } = derive_tuple(record, schema, invalid, headers);
        for issue in &issues {
            warn!(line = record.line(), %issue, "coercion issue");
        }

        let error = match self.sink.insert(table, &tuple) {
            Ok(()) => None,
            Err(err) => {
                warn!(table, line = record.line(), error = %err, "insert failed");
                Some(err.into())
            }
        };
        TableOutcome {
            table: table.to_string(),
            issues,
            null_fields: tuple.null_count(),
            error,
        }
    }

    fn check_header_order(&self, headers: &HeaderMap) {
        let layout = self.registry.detail_layout();
        let drifted = layout
            .columns()
            .iter()
            .enumerate()
            .any(|(idx, column)| headers.index_of(&column.header) != Some(idx));
        if drifted {
            debug!(
                expected = layout.len(),
                found = headers.len(),
                "detail header order differs from the declared layout; columns typed by header name"
            );
        }
    }
}

/// Fold one record's table outcomes into `report`. Returns the first schema
/// failure, which ends processing of the detail file.
fn tally_outcomes(
    report: &mut EntityReport,
    line: u64,
    outcomes: Vec<TableOutcome>,
) -> Option<SchemaError> {
    let mut schema_failure = None;
    for outcome in outcomes {
        let counts = report.tables.entry(outcome.table).or_default();
        counts.null_fields += outcome.null_fields;
        report.coercion_issues += outcome.issues.len();
        match outcome.error {
            None => counts.dispatched += 1,
            Some(DispatchError::Sink(err)) => {
                counts.failed += 1;
                report
                    .failures
                    .push(Failure::new(FailureKind::Sink, format!("line {line}: {err}")));
            }
            Some(DispatchError::Schema(err)) => {
                counts.failed += 1;
                schema_failure.get_or_insert(err);
            }
        }
    }
    schema_failure
}

/// First field of a summary record, unless empty or flagged invalid.
fn entity_identifier<'r>(record: &'r RawRecord, invalid: &InvalidColumnSet) -> Option<&'r str> {
    if invalid.contains(&0) {
        return None;
    }
    record.get(0).filter(|id| !id.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;

    #[test]
    fn identifier_is_first_field_taken_raw() {
        let record = RawRecord::from_fields([" SN1 ", "host"]);
        assert_eq!(
            entity_identifier(&record, &InvalidColumnSet::new()),
            Some(" SN1 ")
        );
    }

    #[test]
    fn blank_or_flagged_identifier_is_missing() {
        let blank = RawRecord::from_fields(["  ", "host"]);
        assert_eq!(entity_identifier(&blank, &InvalidColumnSet::new()), None);

        let record = RawRecord::from_fields(["SN1"]);
        assert_eq!(entity_identifier(&record, &InvalidColumnSet::from([0])), None);

        let empty = RawRecord::from_fields(Vec::<String>::new());
        assert_eq!(entity_identifier(&empty, &InvalidColumnSet::new()), None);
    }

    fn outcome(table: &str, error: Option<DispatchError>) -> TableOutcome {
        TableOutcome {
            table: table.to_string(),
            issues: Vec::new(),
            null_fields: 0,
            error,
        }
    }

    #[test]
    fn sink_failures_are_counted_per_table() {
        let mut report = EntityReport::new("SN1", "SN1-perform.csv");
        let rejected = SinkError::Rejected {
            table: "cpu".into(),
            reason: "full".into(),
        };
        let outcomes = vec![
            outcome("cpu", Some(rejected.into())),
            outcome("disk", None),
        ];

        assert!(tally_outcomes(&mut report, 2, outcomes).is_none());
        assert_eq!(report.tables["cpu"].failed, 1);
        assert_eq!(report.tables["disk"].dispatched, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.starts_with("line 2: "));
        assert!(!report.aborted);
    }

    #[test]
    fn missing_schema_ends_the_detail_file() {
        let mut report = EntityReport::new("SN1", "SN1-perform.csv");
        let missing = SchemaError::TableNotFound {
            table: "disk".into(),
        };
        let outcomes = vec![outcome("cpu", None), outcome("disk", Some(missing.into()))];

        let err = tally_outcomes(&mut report, 5, outcomes).expect("schema failure");
        assert_eq!(err.to_string(), "schema not found for table 'disk'");
        assert_eq!(report.tables["cpu"].dispatched, 1);
        assert_eq!(report.tables["disk"].failed, 1);
    }

    #[test]
    fn jobs_are_at_least_one() {
        assert_eq!(EngineOptions::default().with_jobs(0).jobs, 1);
    }
}
