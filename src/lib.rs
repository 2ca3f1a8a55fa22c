pub mod chart;
pub mod error;
pub mod grading;
pub mod menu;
pub mod output;
pub mod roster;
pub mod store;
pub mod summary;

pub use error::{GradebookError, Result};
pub use grading::pipeline::{DEFAULT_CORE_SUBJECTS, load_data};
pub use grading::school::School;
pub use grading::types::{Student, StudentRecord, Subject};
pub use store::{NameMatch, RecordStore};
