//! Roster loader for `student_data.csv`.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GradebookError, Result};
use crate::grading::types::Student;

pub const ROSTER_FILE: &str = "student_data.csv";

/// lastname, firstname, sid, email, section
const ROSTER_COLUMNS: usize = 5;

/// Students in file order, indexed by uppercased student ID.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    students: Vec<Student>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Adds a student, rejecting a second entry for the same ID.
    pub fn insert(&mut self, student: Student) -> Result<()> {
        if self.index.contains_key(&student.sid) {
            return Err(GradebookError::DuplicateStudent(student.sid));
        }
        self.index.insert(student.sid.clone(), self.students.len());
        self.students.push(student);
        Ok(())
    }

    /// Looks up a student by ID, uppercasing it first.
    pub fn get(&self, sid: &str) -> Option<&Student> {
        self.index
            .get(&normalize_sid(sid))
            .map(|&position| &self.students[position])
    }

    pub(crate) fn get_mut(&mut self, sid: &str) -> Option<&mut Student> {
        let position = *self.index.get(&normalize_sid(sid))?;
        Some(&mut self.students[position])
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }
}

impl IntoIterator for Roster {
    type Item = Student;
    type IntoIter = std::vec::IntoIter<Student>;

    fn into_iter(self) -> Self::IntoIter {
        self.students.into_iter()
    }
}

/// All joins are done on the uppercased ID.
pub fn normalize_sid(sid: &str) -> String {
    sid.trim().to_uppercase()
}

/// Reads `<dir>/student_data.csv` into a [`Roster`] with no subject scores.
///
/// # Errors
///
/// Fails if the file is missing, a row has fewer than five columns, or a
/// student ID appears twice.
#[tracing::instrument(fields(dir = %dir.display()))]
pub fn load_roster(dir: &Path) -> Result<Roster> {
    let path = dir.join(ROSTER_FILE);
    let file = File::open(&path).map_err(|e| GradebookError::io(&path, e))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut roster = Roster::default();

    for result in rdr.records() {
        let row = result.map_err(|e| GradebookError::csv(&path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        if row.len() < ROSTER_COLUMNS {
            return Err(GradebookError::MalformedRow {
                path,
                line,
                expected: ROSTER_COLUMNS,
                found: row.len(),
            });
        }

        let student = Student {
            last_name: row[0].to_string(),
            first_name: row[1].to_string(),
            sid: normalize_sid(&row[2]),
            email: row[3].to_string(),
            section: row[4].to_string(),
            scores: BTreeMap::new(),
        };
        debug!(sid = %student.sid, line, "Roster row parsed");
        roster.insert(student)?;
    }

    info!(students = roster.len(), "Roster loaded");
    Ok(roster)
}
