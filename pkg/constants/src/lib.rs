//! Centralized constants for the nsvault project.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod env;
pub mod git;
pub mod kinds;
pub mod paths;
pub mod run;
