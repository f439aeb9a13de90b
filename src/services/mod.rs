//! Output services module
//!
//! This module contains the file output used to publish the countdown.

pub mod file_writer;

// Re-export main functions
pub use file_writer::*;
