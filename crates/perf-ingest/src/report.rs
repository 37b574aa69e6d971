//! Run reports.
//!
//! Reports are plain data: the engine fills them while streaming and never
//! stops a run because of what they contain. Aggregates are computed on
//! demand from the per-entity entries.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

use serde::Serialize;

/// Category of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FailureKind {
    /// Summary file could not be opened or its header row read.
    SummaryFile,
    /// Detail file could not be opened or lacks required headers.
    DetailFile,
    /// A malformed CSV record was skipped.
    Record,
    /// Summary record without an entity identifier.
    Identifier,
    /// Destination table without a schema.
    Schema,
    /// Sink refused or failed an insert.
    Sink,
    /// Sink failed to flush at the end of the run.
    Flush,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SummaryFile => "summary file",
            FailureKind::DetailFile => "detail file",
            FailureKind::Record => "record",
            FailureKind::Identifier => "identifier",
            FailureKind::Schema => "schema",
            FailureKind::Sink => "sink",
            FailureKind::Flush => "flush",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl fmt::Display) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Per-table dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    /// Tuples accepted by the sink.
    pub dispatched: usize,
    /// Tuples that failed schema lookup or insertion.
    pub failed: usize,
    /// Null fields across all derived tuples.
    pub null_fields: usize,
}

impl AddAssign for TableCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.dispatched += rhs.dispatched;
        self.failed += rhs.failed;
        self.null_fields += rhs.null_fields;
    }
}

/// Outcome of processing one entity's detail file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub identifier: String,
    pub detail_path: PathBuf,
    /// Records read and dispatched.
    pub records: usize,
    /// Records skipped because they could not be parsed.
    pub malformed_records: usize,
    pub invalid_columns: usize,
    pub coercion_issues: usize,
    pub tables: BTreeMap<String, TableCounts>,
    pub failures: Vec<Failure>,
    /// The detail file was abandoned: unopenable, missing required headers,
    /// or a destination table lost its schema mid-file.
    pub aborted: bool,
}

impl EntityReport {
    pub fn new(identifier: impl Into<String>, detail_path: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            detail_path: detail_path.into(),
            ..Self::default()
        }
    }

    pub(crate) fn abort(&mut self, failure: Failure) {
        self.aborted = true;
        self.failures.push(failure);
    }

    pub fn tuples_dispatched(&self) -> usize {
        self.tables.values().map(|counts| counts.dispatched).sum()
    }

    pub fn tuples_failed(&self) -> usize {
        self.tables.values().map(|counts| counts.failed).sum()
    }
}

/// Outcome of processing one summary file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub name: String,
    pub path: PathBuf,
    /// The file was opened and its header row read.
    pub opened: bool,
    pub entities: Vec<EntityReport>,
    pub failures: Vec<Failure>,
}

impl SummaryReport {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub summaries: Vec<SummaryReport>,
    /// Failures not tied to a single summary file.
    pub failures: Vec<Failure>,
}

impl IngestReport {
    fn entities(&self) -> impl Iterator<Item = &EntityReport> {
        self.summaries.iter().flat_map(|summary| &summary.entities)
    }

    pub fn summary_files(&self) -> usize {
        self.summaries.len()
    }

    pub fn failed_summary_files(&self) -> usize {
        self.summaries.iter().filter(|s| !s.opened).count()
    }

    pub fn entity_count(&self) -> usize {
        self.entities().count()
    }

    pub fn aborted_entities(&self) -> usize {
        self.entities().filter(|e| e.aborted).count()
    }

    pub fn detail_records(&self) -> usize {
        self.entities().map(|e| e.records).sum()
    }

    pub fn malformed_records(&self) -> usize {
        self.entities().map(|e| e.malformed_records).sum()
    }

    pub fn invalid_columns(&self) -> usize {
        self.entities().map(|e| e.invalid_columns).sum()
    }

    pub fn coercion_issues(&self) -> usize {
        self.entities().map(|e| e.coercion_issues).sum()
    }

    pub fn tuples_dispatched(&self) -> usize {
        self.entities().map(EntityReport::tuples_dispatched).sum()
    }

    pub fn sink_failures(&self) -> usize {
        self.all_failures()
            .filter(|f| f.kind == FailureKind::Sink)
            .count()
    }

    /// Per-table counters merged across every entity.
    pub fn table_counts(&self) -> BTreeMap<String, TableCounts> {
        let mut merged: BTreeMap<String, TableCounts> = BTreeMap::new();
        for entity in self.entities() {
            for (table, counts) in &entity.tables {
                *merged.entry(table.clone()).or_default() += *counts;
            }
        }
        merged
    }

    /// Every failure in run order: per summary file, then run-level.
    pub fn all_failures(&self) -> impl Iterator<Item = &Failure> {
        self.summaries
            .iter()
            .flat_map(|summary| {
                summary
                    .failures
                    .iter()
                    .chain(summary.entities.iter().flat_map(|e| &e.failures))
            })
            .chain(&self.failures)
    }

    pub fn has_failures(&self) -> bool {
        self.all_failures().next().is_some()
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "summary files:     {} ({} failed)",
            self.summary_files(),
            self.failed_summary_files()
        )?;
        writeln!(
            f,
            "entities:          {} ({} aborted)",
            self.entity_count(),
            self.aborted_entities()
        )?;
        writeln!(
            f,
            "detail records:    {} ({} malformed)",
            self.detail_records(),
            self.malformed_records()
        )?;
        writeln!(f, "invalid columns:   {}", self.invalid_columns())?;
        writeln!(f, "coercion issues:   {}", self.coercion_issues())?;
        writeln!(f, "tuples dispatched: {}", self.tuples_dispatched())?;
        write!(f, "sink failures:     {}", self.sink_failures())
    }
}
