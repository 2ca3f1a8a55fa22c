use grade_placement::output::{export_csv, read_export};
use grade_placement::summary::summarize;
use grade_placement::{
    DEFAULT_CORE_SUBJECTS, GradebookError, NameMatch, School, Subject, load_data,
};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/class4")
}

/// Copies the fixture class into a temp dir so a test can break it.
fn copy_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(fixture_dir()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    dir
}

#[test]
fn test_full_pipeline() {
    let store = load_data(&fixture_dir(), &DEFAULT_CORE_SUBJECTS).expect("Failed to load class");

    assert_eq!(store.len(), 4);
    let ids: Vec<_> = store.records().iter().map(|r| r.sid()).collect();
    assert_eq!(ids, vec!["AB123", "CD456", "EF789", "GH012"]);

    let anna = store.get_by_id("ab123").unwrap();
    assert_eq!(anna.score(Subject::Deutsch), Some(1.67));
    assert_eq!(anna.score(Subject::Mathematik), Some(2.0));
    assert_eq!(anna.score(Subject::Hsu), Some(2.5));
    assert_eq!(anna.score(Subject::Englisch), Some(1.67));
    assert_eq!(anna.average_core(), 2.06);
    assert_eq!(anna.school(), School::Gymnasium);

    let ben = store.get_by_id("CD456").unwrap();
    assert_eq!(ben.score(Subject::Hsu), Some(2.67));
    assert_eq!(ben.average_core(), 2.56);
    assert_eq!(ben.school(), School::Realschule);

    let clara = store.get_by_id("Ef789").unwrap();
    assert_eq!(clara.average_core(), 2.78);
    assert_eq!(clara.school(), School::Orientierungsschule);

    let david = store.get_by_id("gh012").unwrap();
    assert_eq!(david.score(Subject::Musik), None);
    assert_eq!(david.average_core(), 3.39);
    assert_eq!(david.school(), School::Mittelschule);
}

#[test]
fn test_core_subjects_are_configurable() {
    let store = load_data(&fixture_dir(), &[Subject::Sport]).unwrap();

    let david = store.get_by_id("GH012").unwrap();
    assert_eq!(david.average_core(), 3.0);
    assert_eq!(david.school(), School::Mittelschule);
    assert_eq!(store.get_by_id("AB123").unwrap().school(), School::Gymnasium);
}

#[test]
fn test_non_core_subject_missing_is_fatal_when_made_core() {
    let err = load_data(&fixture_dir(), &[Subject::Deutsch, Subject::Musik]).unwrap_err();
    assert!(matches!(
        err,
        GradebookError::MissingCoreSubject { ref sid, ref subject } if sid == "GH012" && subject == "musik"
    ));
}

#[test]
fn test_last_name_search() {
    let store = load_data(&fixture_dir(), &DEFAULT_CORE_SUBJECTS).unwrap();

    let matches = store.find_by_last_name("SCHM");
    assert!(matches!(matches, NameMatch::Many(ref records) if records.len() == 2));
    assert_eq!(matches.select(2).unwrap().first_name(), "Clara");

    assert!(matches!(store.find_by_last_name("mue"), NameMatch::One(r) if r.sid() == "AB123"));
    assert!(matches!(store.find_by_last_name("Huber"), NameMatch::None));
}

#[test]
fn test_summary_per_section() {
    let store = load_data(&fixture_dir(), &DEFAULT_CORE_SUBJECTS).unwrap();
    let summary = summarize(&store);

    assert_eq!(summary.count("4a", School::Gymnasium), 1);
    assert_eq!(summary.count("4a", School::Realschule), 1);
    assert_eq!(summary.count("4b", School::Orientierungsschule), 1);
    assert_eq!(summary.count("4b", School::Mittelschule), 1);
    assert_eq!(summary.total(), 4);
}

#[test]
fn test_export_round_trip() {
    let store = load_data(&fixture_dir(), &DEFAULT_CORE_SUBJECTS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.csv");

    export_csv(&path, &store).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[4],
        "David,Weber,GH012,david.weber@grundschule.de,4b,3.5,3.67,3.0,3.0,,3.33,3.39,Mittelschule"
    );
    // Whole-number averages keep their decimal.
    assert!(lines[1].starts_with("Anna,Mueller,AB123,"));
    assert!(lines[1].contains(",2.0,"));
    assert!(lines[1].contains(",1.0,"));

    let loaded = read_export(&path).unwrap();
    assert_eq!(loaded.as_slice(), store.records());
}

#[test]
fn test_unknown_student_in_grade_file_aborts_before_output() {
    let dir = copy_fixture();
    let grades = dir.path().join("grades_sport.csv");
    let mut content = fs::read_to_string(&grades).unwrap();
    content.push_str("ZZ999,1\n");
    fs::write(&grades, content).unwrap();

    let err = load_data(dir.path(), &DEFAULT_CORE_SUBJECTS).unwrap_err();
    assert!(matches!(
        err,
        GradebookError::UnknownStudent { ref sid, line: 6, .. } if sid == "ZZ999"
    ));
    assert!(!dir.path().join("output.csv").exists());
}

#[test]
fn test_unexpected_grade_file_is_rejected() {
    let dir = copy_fixture();
    fs::write(dir.path().join("grades_latein.csv"), "sid,sa\nAB123,2\n").unwrap();

    let err = load_data(dir.path(), &DEFAULT_CORE_SUBJECTS).unwrap_err();
    assert!(matches!(err, GradebookError::UnexpectedGradeFile { .. }));
}

#[test]
fn test_missing_core_grade_file_is_fatal() {
    let dir = copy_fixture();
    fs::remove_file(dir.path().join("grades_hsu.csv")).unwrap();

    let err = load_data(dir.path(), &DEFAULT_CORE_SUBJECTS).unwrap_err();
    assert!(matches!(err, GradebookError::MissingCoreSubject { .. }));
}

#[test]
fn test_missing_roster_is_fatal() {
    let dir = copy_fixture();
    fs::remove_file(dir.path().join("student_data.csv")).unwrap();

    assert!(matches!(
        load_data(dir.path(), &DEFAULT_CORE_SUBJECTS).unwrap_err(),
        GradebookError::Io { .. }
    ));
}
