//! Use cases - User story orchestration.
//!
//! `planner` drives a build from the first race pick to export.

pub mod planner;
