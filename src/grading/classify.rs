use std::collections::BTreeSet;
use tracing::info;

use crate::error::{GradebookError, Result};
use crate::grading::school::School;
use crate::grading::types::{Student, StudentRecord, Subject};
use crate::grading::utility::{mean, round2};
use crate::roster::Roster;

/// Computes each student's core average and school placement.
///
/// The core average is the unweighted mean of the already-rounded subject
/// averages for `core_subjects`, rounded again to two decimals. Repeated
/// subjects in `core_subjects` count once.
///
/// # Errors
///
/// Fails if `core_subjects` is empty or any student lacks one of them.
#[tracing::instrument(skip(roster), fields(students = roster.len()))]
pub fn classify(roster: Roster, core_subjects: &[Subject]) -> Result<Vec<StudentRecord>> {
    let core: BTreeSet<Subject> = core_subjects.iter().copied().collect();
    if core.is_empty() {
        return Err(GradebookError::NoCoreSubjects);
    }

    let records = roster
        .into_iter()
        .map(|student| classify_student(student, &core))
        .collect::<Result<Vec<_>>>()?;

    info!(
        gymnasium = count(&records, School::Gymnasium),
        realschule = count(&records, School::Realschule),
        orientierungsschule = count(&records, School::Orientierungsschule),
        mittelschule = count(&records, School::Mittelschule),
        "Students classified"
    );

    Ok(records)
}

fn classify_student(student: Student, core: &BTreeSet<Subject>) -> Result<StudentRecord> {
    let averages = core
        .iter()
        .map(|&subject| {
            student
                .score(subject)
                .ok_or_else(|| GradebookError::MissingCoreSubject {
                    sid: student.sid.clone(),
                    subject: subject.to_string(),
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    let average_core = round2(mean(&averages));

    Ok(StudentRecord {
        student,
        average_core,
        school: School::from_average(average_core),
    })
}

fn count(records: &[StudentRecord], school: School) -> usize {
    records.iter().filter(|r| r.school == school).count()
}
