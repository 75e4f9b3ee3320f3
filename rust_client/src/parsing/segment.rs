//! Exposure segment files: raw JSON structures and conversion to domain
//! records.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::domain::{ExposureConfig, GroupPacket};
use crate::error::{Error, Result};
use crate::time::mjd::parse_utc;

/// Raw JSON structure for the exposure configuration block, using the
/// keyword names of the originating primary header.
#[derive(Debug, Deserialize)]
struct RawExposure {
    nints: i64,
    ngroups: i64,
    nframes: i64,
    groupgap: i64,
    nresets: i64,
    tframe: f64,
    bartdelt: f64,
}

/// Raw JSON structure for optional segment bookkeeping.
#[derive(Debug, Deserialize)]
struct RawSegmentInfo {
    exsegnum: i64,
    exsegtot: i64,
    intstart: i64,
    intend: i64,
}

/// Raw JSON structure for one GROUP table row.
#[derive(Debug, Deserialize)]
struct RawGroupRow {
    integration_number: i64,
    group_number: i64,
    group_end_time: String,
}

/// Raw JSON structure for a whole segment file.
#[derive(Debug, Deserialize)]
struct RawSegment {
    exposure: RawExposure,
    #[serde(default)]
    segment: Option<RawSegmentInfo>,
    groups: Vec<RawGroupRow>,
}

/// Bookkeeping for a segmented exposure: which slice of the integration
/// range this file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    pub number: i64,
    pub total: i64,
    pub int_start: i64,
    pub int_end: i64,
}

/// One parsed segment: validated configuration, optional bookkeeping,
/// and its group packets.
#[derive(Debug, Clone)]
pub struct ExposureSegment {
    pub config: ExposureConfig,
    pub segment: Option<SegmentInfo>,
    pub packets: Vec<GroupPacket>,
}

/// Parse a segment from its JSON text.
pub fn parse_segment_str(text: &str) -> Result<ExposureSegment> {
    let raw: RawSegment = serde_json::from_str(text)?;

    let config = ExposureConfig {
        n_integrations: raw.exposure.nints,
        n_groups: raw.exposure.ngroups,
        n_frames: raw.exposure.nframes,
        group_gap: raw.exposure.groupgap,
        n_resets: raw.exposure.nresets,
        frame_time: raw.exposure.tframe,
        barycentric_time_delta: raw.exposure.bartdelt,
    };
    config.validate()?;

    if raw.groups.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "segment contains {} group packet(s), need at least 2",
            raw.groups.len()
        )));
    }

    let packets = raw
        .groups
        .iter()
        .map(|row| {
            Ok(GroupPacket {
                integration: row.integration_number,
                group: row.group_number,
                end_time: parse_utc(&row.group_end_time)?,
            })
        })
        .collect::<Result<Vec<GroupPacket>>>()?;

    let segment = raw.segment.map(|s| SegmentInfo {
        number: s.exsegnum,
        total: s.exsegtot,
        int_start: s.intstart,
        int_end: s.intend,
    });

    Ok(ExposureSegment {
        config,
        segment,
        packets,
    })
}

/// Parse a segment file.
pub fn parse_segment_file(path: &Path) -> Result<ExposureSegment> {
    let text = fs::read_to_string(path)?;
    parse_segment_str(&text)
}
