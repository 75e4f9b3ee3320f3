//! Parsers for exposure input formats.
//!
//! An exposure arrives as one or more *segment* files: JSON documents
//! carrying the exposure configuration from a segment's primary header
//! and the end-of-group packet rows from its GROUP table.

pub mod segment;

#[cfg(test)]
mod segment_tests;

pub use segment::{parse_segment_file, parse_segment_str, ExposureSegment, SegmentInfo};
