//! In-memory record store built once the pipeline has classified every
//! student. Read-only after construction.

use std::collections::HashMap;

use crate::error::{GradebookError, Result};
use crate::grading::types::StudentRecord;
use crate::roster::normalize_sid;

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<StudentRecord>,
    index: HashMap<String, usize>,
}

/// Outcome of a last-name search.
#[derive(Debug)]
pub enum NameMatch<'a> {
    None,
    One(&'a StudentRecord),
    Many(Vec<&'a StudentRecord>),
}

/// Picks from a numbered list by its 1-based menu number. `0` and numbers
/// past the end give `None`.
pub fn pick<'a>(records: &[&'a StudentRecord], choice: usize) -> Option<&'a StudentRecord> {
    records.get(choice.checked_sub(1)?).copied()
}

impl<'a> NameMatch<'a> {
    /// Picks a record by its 1-based menu number. For [`NameMatch::One`]
    /// only choice 1 is valid.
    pub fn select(&self, choice: usize) -> Option<&'a StudentRecord> {
        match self {
            NameMatch::None => None,
            NameMatch::One(record) => pick(&[*record], choice),
            NameMatch::Many(records) => pick(records, choice),
        }
    }
}

impl RecordStore {
    /// Builds the store from classified records.
    ///
    /// The records come from a [`crate::roster::Roster`], whose IDs are
    /// already unique.
    pub fn new(records: Vec<StudentRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.sid().to_string(), position))
            .collect();
        Self { records, index }
    }

    /// Exact lookup by student ID, case-insensitive.
    pub fn get_by_id(&self, sid: &str) -> Result<&StudentRecord> {
        let sid = normalize_sid(sid);
        self.index
            .get(&sid)
            .map(|&position| &self.records[position])
            .ok_or(GradebookError::StudentNotFound(sid))
    }

    /// Every record whose last name contains `query`, ignoring case.
    pub fn find_by_last_name(&self, query: &str) -> NameMatch<'_> {
        let needle = query.trim().to_uppercase();
        let mut found: Vec<&StudentRecord> = self
            .records
            .iter()
            .filter(|r| r.last_name().to_uppercase().contains(&needle))
            .collect();

        match found.len() {
            0 => NameMatch::None,
            1 => NameMatch::One(found.remove(0)),
            _ => NameMatch::Many(found),
        }
    }

    /// Records in roster order.
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
