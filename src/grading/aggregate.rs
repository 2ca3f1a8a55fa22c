use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{GradebookError, Result};
use crate::grading::types::Subject;
use crate::grading::utility::{mean, round2};
use crate::roster::{Roster, normalize_sid};

const GRADE_FILE_PREFIX: &str = "grades_";
const GRADE_FILE_EXTENSION: &str = "csv";

/// Finds every `grades_<subject>.csv` in `dir` and maps it to its [`Subject`].
///
/// Paths are returned sorted so that log output is stable; the merge result
/// does not depend on the order.
///
/// # Errors
///
/// Fails if the directory cannot be listed or a matching file names a
/// subject outside [`Subject`].
pub fn discover_grade_files(dir: &Path) -> Result<Vec<(Subject, PathBuf)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| GradebookError::io(dir, e))? {
        let entry = entry.map_err(|e| GradebookError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(GRADE_FILE_EXTENSION) {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(suffix) = name.strip_prefix(GRADE_FILE_PREFIX) else {
            continue;
        };

        let subject = suffix
            .parse::<Subject>()
            .map_err(|_| GradebookError::UnexpectedGradeFile {
                path: path.clone(),
                subject: suffix.to_string(),
            })?;
        files.push((subject, path));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Merges every discovered grade file into `roster`, one subject average per
/// student and file.
#[tracing::instrument(skip(roster), fields(dir = %dir.display(), students = roster.len()))]
pub fn aggregate_subjects(dir: &Path, mut roster: Roster) -> Result<Roster> {
    let files = discover_grade_files(dir)?;
    info!(files = files.len(), "Grade files discovered");

    for (subject, path) in files {
        let rows = merge_subject_file(&path, subject, &mut roster)?;
        debug!(%subject, path = %path.display(), rows, "Grade file merged");
    }

    Ok(roster)
}

/// Reads one grade file and stores the rounded mean of each row's scores
/// under `subject`. Returns the number of rows merged.
fn merge_subject_file(path: &Path, subject: Subject, roster: &mut Roster) -> Result<usize> {
    let file = File::open(path).map_err(|e| GradebookError::io(path, e))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut merged = 0;

    for result in rdr.records() {
        let row = result.map_err(|e| GradebookError::csv(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        if row.len() < 2 {
            return Err(GradebookError::MalformedRow {
                path: path.to_path_buf(),
                line,
                expected: 2,
                found: row.len(),
            });
        }

        let scores = row
            .iter()
            .skip(1)
            .map(|value| parse_score(value, path, line))
            .collect::<Result<Vec<f64>>>()?;

        let sid = normalize_sid(&row[0]);
        let student = roster
            .get_mut(&sid)
            .ok_or_else(|| GradebookError::UnknownStudent {
                path: path.to_path_buf(),
                line,
                sid: sid.clone(),
            })?;

        if student.scores.contains_key(&subject) {
            return Err(GradebookError::DuplicateScore {
                path: path.to_path_buf(),
                line,
                subject: subject.to_string(),
                sid,
            });
        }
        student.scores.insert(subject, round2(mean(&scores)));
        merged += 1;
    }

    Ok(merged)
}

fn parse_score(value: &str, path: &Path, line: u64) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| GradebookError::InvalidScore {
            path: path.to_path_buf(),
            line,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{ROSTER_FILE, load_roster};

    fn class_dir(grade_files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(ROSTER_FILE),
            "lastname,firstname,sid,email,section\n\
             Mueller,Anna,ab123,anna@schule.de,4a\n\
             Schmidt,Ben,CD456,ben@schule.de,4b\n",
        )
        .unwrap();
        for (name, contents) in grade_files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn aggregate(dir: &tempfile::TempDir) -> Result<Roster> {
        let roster = load_roster(dir.path()).unwrap();
        aggregate_subjects(dir.path(), roster)
    }

    #[test]
    fn test_discover_ignores_other_files() {
        let dir = class_dir(&[
            ("grades_deutsch.csv", "sid,a\n"),
            ("grades_sport.csv", "sid,a\n"),
            ("grades_musik.txt", "sid,a\n"),
            ("output.csv", "firstname\n"),
        ]);
        let files = discover_grade_files(dir.path()).unwrap();
        let subjects: Vec<_> = files.iter().map(|(s, _)| *s).collect();
        assert_eq!(subjects, vec![Subject::Deutsch, Subject::Sport]);
    }

    #[test]
    fn test_discover_rejects_unknown_subject() {
        let dir = class_dir(&[("grades_latein.csv", "sid,a\n")]);
        let err = discover_grade_files(dir.path()).unwrap_err();
        assert!(matches!(err, GradebookError::UnexpectedGradeFile { subject, .. } if subject == "latein"));
    }

    #[test]
    fn test_subject_average_is_rounded_mean() {
        let dir = class_dir(&[(
            "grades_deutsch.csv",
            "sid,hw1,hw2,quiz,sa\n\
             AB123,2,3,2,3\n\
             cd456,1,2,2,1,2,2\n",
        )]);
        let roster = aggregate(&dir).unwrap();

        assert_eq!(roster.get("AB123").unwrap().score(Subject::Deutsch), Some(2.5));
        assert_eq!(roster.get("CD456").unwrap().score(Subject::Deutsch), Some(1.67));
    }

    #[test]
    fn test_each_subject_fills_its_own_field() {
        let dir = class_dir(&[
            ("grades_sport.csv", "sid,sa\nab123,1\ncd456,3\n"),
            ("grades_englisch.csv", "sid,hw,quiz,sa\nab123,2,1,2\n"),
        ]);
        let roster = aggregate(&dir).unwrap();

        let anna = roster.get("ab123").unwrap();
        assert_eq!(anna.score(Subject::Sport), Some(1.0));
        assert_eq!(anna.score(Subject::Englisch), Some(1.67));
        let ben = roster.get("cd456").unwrap();
        assert_eq!(ben.score(Subject::Sport), Some(3.0));
        assert_eq!(ben.score(Subject::Englisch), None);
    }

    #[test]
    fn test_unknown_student_is_fatal() {
        let dir = class_dir(&[("grades_hsu.csv", "sid,a,b\nab123,1,2\nxx999,2,2\n")]);
        let err = aggregate(&dir).unwrap_err();
        assert!(matches!(
            err,
            GradebookError::UnknownStudent { line: 3, ref sid, .. } if sid == "XX999"
        ));
    }

    #[test]
    fn test_non_numeric_score_is_fatal() {
        let dir = class_dir(&[("grades_hsu.csv", "sid,a,b\nab123,1,zwei\n")]);
        let err = aggregate(&dir).unwrap_err();
        assert!(matches!(err, GradebookError::InvalidScore { ref value, .. } if value == "zwei"));
    }

    #[test]
    fn test_non_finite_score_is_fatal() {
        let dir = class_dir(&[("grades_hsu.csv", "sid,a\nab123,NaN\n")]);
        assert!(matches!(
            aggregate(&dir).unwrap_err(),
            GradebookError::InvalidScore { .. }
        ));
    }

    #[test]
    fn test_row_without_scores_is_fatal() {
        let dir = class_dir(&[("grades_hsu.csv", "sid,a\nab123\n")]);
        assert!(matches!(
            aggregate(&dir).unwrap_err(),
            GradebookError::MalformedRow { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn test_repeated_student_in_one_file_is_fatal() {
        let dir = class_dir(&[("grades_musik.csv", "sid,a\nab123,1\nAB123,2\n")]);
        assert!(matches!(
            aggregate(&dir).unwrap_err(),
            GradebookError::DuplicateScore { line: 3, .. }
        ));
    }
}
