//! Grade aggregation and school placement.
//!
//! This module merges the per-subject grade files into the roster, averages
//! each student's core subjects and places the student in a secondary school.

pub mod aggregate;
pub mod classify;
pub mod pipeline;
pub mod school;
pub mod types;
pub mod utility;
