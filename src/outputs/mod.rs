//! Output generation for the harvest report.
//!
//! The core pipeline hands over an unsorted set of kept articles; this
//! module owns sorting, column formatting, and file serialization.

pub mod csv;
