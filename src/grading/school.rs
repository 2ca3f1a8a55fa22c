use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GradebookError;

/// Secondary-school track, ordered from best to worst core average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum School {
    Gymnasium,
    Realschule,
    Orientierungsschule,
    Mittelschule,
}

impl School {
    pub const ALL: [School; 4] = [
        School::Gymnasium,
        School::Realschule,
        School::Orientierungsschule,
        School::Mittelschule,
    ];

    /// Places a student by core average (lower is better).
    ///
    /// | Range              | School              |
    /// |--------------------|---------------------|
    /// | <= 2.33            | Gymnasium           |
    /// | > 2.33, <= 2.66    | Realschule          |
    /// | > 2.66, < 3.0      | Orientierungsschule |
    /// | >= 3.0             | Mittelschule        |
    pub fn from_average(average_core: f64) -> Self {
        match average_core {
            a if a <= 2.33 => School::Gymnasium,
            a if a <= 2.66 => School::Realschule,
            a if a < 3.0 => School::Orientierungsschule,
            _ => School::Mittelschule,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            School::Gymnasium => "Gymnasium",
            School::Realschule => "Realschule",
            School::Orientierungsschule => "Orientierungsschule",
            School::Mittelschule => "Mittelschule",
        }
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for School {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        School::ALL
            .into_iter()
            .find(|school| school.as_str() == s.trim())
            .ok_or_else(|| GradebookError::UnknownSchool(s.to_string()))
    }
}
