use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::grading::school::School;
use crate::store::RecordStore;

/// Pupil counts per section and school, sections sorted by name.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub sections: BTreeMap<String, BTreeMap<School, usize>>,
}

impl SectionSummary {
    pub fn count(&self, section: &str, school: School) -> usize {
        self.sections
            .get(section)
            .and_then(|schools| schools.get(&school))
            .copied()
            .unwrap_or(0)
    }

    /// Largest single (section, school) count, used to scale charts.
    pub fn max_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|schools| schools.values())
            .copied()
            .max()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.sections
            .values()
            .flat_map(|schools| schools.values())
            .sum()
    }
}

/// Groups the store by section, then by school.
pub fn summarize(store: &RecordStore) -> SectionSummary {
    let mut summary = SectionSummary::default();
    for record in store.records() {
        *summary
            .sections
            .entry(record.section().to_string())
            .or_default()
            .entry(record.school())
            .or_default() += 1;
    }
    summary
}

/// Summary with a generation timestamp, printed by the `summary` command.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub students: usize,
    pub sections: BTreeMap<String, BTreeMap<School, usize>>,
}

impl SummaryReport {
    pub fn from_store(store: &RecordStore) -> Self {
        let summary = summarize(store);
        SummaryReport {
            generated_at: Utc::now(),
            students: summary.total(),
            sections: summary.sections,
        }
    }
}
