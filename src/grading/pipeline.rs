use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::grading::aggregate::aggregate_subjects;
use crate::grading::classify::classify;
use crate::grading::types::Subject;
use crate::roster::load_roster;
use crate::store::RecordStore;

/// Subjects whose averages decide the school placement unless overridden.
pub const DEFAULT_CORE_SUBJECTS: [Subject; 3] = [Subject::Deutsch, Subject::Hsu, Subject::Mathematik];

/// Runs roster loading, subject aggregation and classification for the
/// class data in `dir`, returning the finished [`RecordStore`].
///
/// Nothing is written to disk; any error aborts before a store exists.
#[tracing::instrument(fields(dir = %dir.display()))]
pub fn load_data(dir: &Path, core_subjects: &[Subject]) -> Result<RecordStore> {
    let roster = load_roster(dir)?;
    let roster = aggregate_subjects(dir, roster)?;
    let records = classify(roster, core_subjects)?;

    let store = RecordStore::new(records);
    info!(students = store.len(), "Record store ready");
    Ok(store)
}
