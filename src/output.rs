//! Output formatting and persistence for student records.
//!
//! Supports JSON serialization, a `key : value` dump and the fixed-column
//! CSV export. Numbers are written with at least one decimal (`2.0`).

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::GradebookError;
use crate::grading::school::School;
use crate::grading::types::{Student, StudentRecord, Subject};
use crate::roster::normalize_sid;
use crate::store::RecordStore;

/// Header of the exported CSV. Order and names are fixed.
pub const EXPORT_HEADER: [&str; 13] = [
    "firstname",
    "lastname",
    "sid",
    "email",
    "section",
    "deutsch",
    "mathematik",
    "hsu",
    "sport",
    "musik",
    "englisch",
    "average_core",
    "school",
];

/// Writes all records as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, store: &RecordStore) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, store.records())?;
    writeln!(out)?;
    Ok(())
}

/// Writes one record as `key : value` lines in export column order.
/// Subjects the student has no grades for are left out.
pub fn write_record<W: Write>(out: &mut W, record: &StudentRecord) -> std::io::Result<()> {
    for (key, value) in EXPORT_HEADER.iter().zip(export_row(record)) {
        if !value.is_empty() {
            writeln!(out, "{} : {}", key, value)?;
        }
    }
    Ok(())
}

/// Appends `.csv` to `name` unless it already ends with it.
pub fn export_path(name: &str) -> PathBuf {
    if name.to_lowercase().ends_with(".csv") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{}.csv", name))
    }
}

/// Writes every record in the store to `path`, replacing any existing file.
pub fn export_csv(path: &Path, store: &RecordStore) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(EXPORT_HEADER)?;
    for record in store.records() {
        writer.write_record(export_row(record))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = store.len(), "CSV export written");
    Ok(())
}

fn export_row(record: &StudentRecord) -> Vec<String> {
    let mut row = vec![
        record.first_name().to_string(),
        record.last_name().to_string(),
        record.sid().to_string(),
        record.email().to_string(),
        record.section().to_string(),
    ];
    // Missing subjects stay empty; the columns are positional.
    row.extend(
        Subject::EXPORT_ORDER
            .iter()
            .map(|&subject| record.score(subject).map(decimal).unwrap_or_default()),
    );
    row.push(decimal(record.average_core()));
    row.push(record.school().to_string());
    row
}

/// `2.0` rather than `2`; the debug form keeps the trailing decimal.
fn decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// Reads a file written by [`export_csv`] back into records.
pub fn read_export(path: &Path) -> Result<Vec<StudentRecord>> {
    let file = File::open(path).map_err(|e| GradebookError::io(path, e))?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    if !headers.iter().eq(EXPORT_HEADER) {
        anyhow::bail!("{} does not have the export header", path.display());
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let parse = |value: &str| {
            value.parse::<f64>().map_err(|_| GradebookError::InvalidScore {
                path: path.to_path_buf(),
                line,
                value: value.to_string(),
            })
        };

        let mut scores = BTreeMap::new();
        for (offset, subject) in Subject::EXPORT_ORDER.iter().enumerate() {
            let value = &row[5 + offset];
            if !value.is_empty() {
                scores.insert(*subject, parse(value)?);
            }
        }

        records.push(StudentRecord {
            student: Student {
                first_name: row[0].to_string(),
                last_name: row[1].to_string(),
                sid: normalize_sid(&row[2]),
                email: row[3].to_string(),
                section: row[4].to_string(),
                scores,
            },
            average_core: parse(&row[11])?,
            school: row[12].parse::<School>()?,
        });
    }

    Ok(records)
}
