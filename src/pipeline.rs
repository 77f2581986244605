//! Publication runs.
//!
//! A run fetches each family's records once from a [`RecordSource`], builds
//! every family in publication order and hands the tables to the CSV sink.
//! Any family failure aborts the whole run.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PublicationConfig;
use crate::error::{PublicationError, PublicationResult};
use crate::families::{
    FamilyInput, FamilyOutput, build_family, reason_staff::REASON_TABLE,
    sickness_rates::BREAKDOWNS_TABLE,
};
use crate::layout::{TaggedTable, monthly, reason};
use crate::models::{AbsenceRecord, OrgReference, PublicationFamily, PublicationTable};
use crate::quality::scope_violations;

/// Engine version stamped on every run.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supplies the records of each publication family.
///
/// Implementations own the scope contract: records arrive already limited
/// to England, the reporting window and the permitted organisation codes.
pub trait RecordSource {
    /// The record set of one family.
    fn records(&self, family: PublicationFamily) -> PublicationResult<Vec<AbsenceRecord>>;

    /// The latest organisation reference.
    fn latest_orgs(&self) -> PublicationResult<Vec<OrgReference>>;
}

/// A source holding records in memory.
///
/// Families without their own record set read the shared one.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    shared: Vec<AbsenceRecord>,
    per_family: Vec<(PublicationFamily, Vec<AbsenceRecord>)>,
    latest_orgs: Vec<OrgReference>,
}

impl InMemorySource {
    /// Creates a source serving `records` to every family.
    pub fn new(records: Vec<AbsenceRecord>, latest_orgs: Vec<OrgReference>) -> Self {
        Self {
            shared: records,
            per_family: Vec::new(),
            latest_orgs,
        }
    }

    /// Serves `records` to `family` instead of the shared set.
    pub fn with_family_records(
        mut self,
        family: PublicationFamily,
        records: Vec<AbsenceRecord>,
    ) -> Self {
        self.per_family.retain(|(f, _)| *f != family);
        self.per_family.push((family, records));
        self
    }
}

impl RecordSource for InMemorySource {
    fn records(&self, family: PublicationFamily) -> PublicationResult<Vec<AbsenceRecord>> {
        Ok(self
            .per_family
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, records)| records.clone())
            .unwrap_or_else(|| self.shared.clone()))
    }

    fn latest_orgs(&self) -> PublicationResult<Vec<OrgReference>> {
        Ok(self.latest_orgs.clone())
    }
}

/// A source reading one CSV extract per family from a directory.
///
/// ```text
/// extracts/
/// ├── absence.csv        # sickness rates records
/// ├── benchmarking.csv
/// ├── covid.csv
/// ├── reason_staff.csv
/// └── latest_orgs.csv    # organisation reference
/// ```
///
/// Headers are the snake_case field names of [`AbsenceRecord`] and
/// [`OrgReference`]; empty fields read as absent.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    /// Creates a source over `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Extract file name of a family.
    pub fn file_name(family: PublicationFamily) -> &'static str {
        match family {
            PublicationFamily::SicknessRates => "absence.csv",
            PublicationFamily::Benchmarking => "benchmarking.csv",
            PublicationFamily::Covid => "covid.csv",
            PublicationFamily::ReasonByStaff => "reason_staff.csv",
        }
    }

    fn read<T: DeserializeOwned>(&self, file_name: &str) -> PublicationResult<Vec<T>> {
        let path = self.dir.join(file_name);
        let path_str = path.display().to_string();
        let to_error = |message: String| PublicationError::SourceError {
            path: path_str.clone(),
            message,
        };

        let mut reader = csv::Reader::from_path(&path).map_err(|e| to_error(e.to_string()))?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| to_error(e.to_string()))?;

        info!(path = %path_str, rows = rows.len(), "Read extract");
        Ok(rows)
    }
}

impl RecordSource for CsvDirectorySource {
    fn records(&self, family: PublicationFamily) -> PublicationResult<Vec<AbsenceRecord>> {
        self.read(Self::file_name(family))
    }

    fn latest_orgs(&self) -> PublicationResult<Vec<OrgReference>> {
        self.read("latest_orgs.csv")
    }
}

/// The outputs of one publication run.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationRun {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the run.
    pub engine_version: String,
    /// The date stamped into the tables.
    pub month_date: NaiveDate,
    /// One output per family, in publication order.
    pub outputs: Vec<FamilyOutput>,
    /// Total run time in microseconds.
    pub duration_us: u64,
}

impl PublicationRun {
    /// Every published table, in publication order.
    pub fn tables(&self) -> impl Iterator<Item = &PublicationTable> {
        self.outputs.iter().flat_map(|output| output.tables.iter())
    }

    /// The table with the given name.
    pub fn table(&self, name: &str) -> Option<&PublicationTable> {
        self.tables().find(|table| table.name == name)
    }
}

/// Builds every publication family from `source`.
///
/// # Errors
///
/// Returns the first source or family error; no partial run is returned.
pub fn run_publication<S: RecordSource + ?Sized>(
    config: &PublicationConfig,
    source: &S,
) -> PublicationResult<PublicationRun> {
    let start_time = Instant::now();
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, month_date = %config.month_date, "Starting publication run");

    let latest_orgs = source.latest_orgs()?;
    let mut outputs = Vec::with_capacity(PublicationFamily::ALL.len());

    for family in PublicationFamily::ALL {
        let records = source.records(family)?;

        let violations = scope_violations(&records);
        if !violations.is_empty() {
            warn!(
                run_id = %run_id,
                family = %family,
                org_codes = ?violations,
                "Records include organisations outside the source scope"
            );
        }

        let input = FamilyInput {
            records: &records,
            latest_orgs: &latest_orgs,
            publication_date: config.month_date,
        };
        outputs.push(build_family(family, input)?);
    }

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(run_id = %run_id, duration_us, "Publication run complete");

    Ok(PublicationRun {
        run_id,
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        month_date: config.month_date,
        outputs,
        duration_us,
    })
}

fn output_error(path: &Path, e: impl ToString) -> PublicationError {
    PublicationError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Writes every table of a run as `<table>_<start_date>.csv` in the
/// configured output directory, returning the paths written.
pub fn write_outputs(
    run: &PublicationRun,
    config: &PublicationConfig,
) -> PublicationResult<Vec<PathBuf>> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir).map_err(|e| output_error(dir, e))?;

    let mut written = Vec::new();
    for table in run.tables() {
        let path = dir.join(config.output_file_name(&table.name));
        let file = File::create(&path).map_err(|e| output_error(&path, e))?;
        table.write_csv(BufWriter::new(file))?;
        info!(path = %path.display(), rows = table.rows.len(), "Wrote table");
        written.push(path);
    }

    Ok(written)
}

/// The tagged blocks of both workbooks.
///
/// # Errors
///
/// Returns [`PublicationError::RowNotFound`] when a template label has no
/// row in the run's tables.
pub fn workbook_tables(run: &PublicationRun) -> PublicationResult<Vec<TaggedTable>> {
    let table = |name: &str| {
        run.table(name).ok_or_else(|| PublicationError::RowNotFound {
            table: name.to_string(),
            label: "any".to_string(),
        })
    };

    let mut tables = monthly::monthly_tables(table(BREAKDOWNS_TABLE)?)?;
    tables.extend(reason::reason_tables(table(REASON_TABLE)?, run.month_date)?);
    Ok(tables)
}

/// Writes the tagged workbook blocks as JSON for the presentation layer.
pub fn write_workbook_tables<W: io::Write>(
    tables: &[TaggedTable],
    writer: W,
) -> PublicationResult<()> {
    serde_json::to_writer_pretty(writer, tables).map_err(|e| PublicationError::OutputError {
        path: "workbook tables".to_string(),
        message: e.to_string(),
    })
}
