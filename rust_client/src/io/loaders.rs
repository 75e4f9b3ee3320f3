//! Loading segment files into a single reconciliation input, and writing
//! the diagnostic and result tables.

use std::path::{Path, PathBuf};

use log::debug;

use crate::core::domain::{ExposureConfig, GroupPacket, IntegrationTiming};
use crate::error::{Error, Result};
use crate::parsing::segment::{parse_segment_file, SegmentInfo};
use crate::timing::reconcile::TimingFit;

/// Bookkeeping about one loaded segment file, kept for reporting.
#[derive(Debug, Clone)]
pub struct LoadedSegment {
    pub path: PathBuf,
    pub segment: Option<SegmentInfo>,
    pub n_packets: usize,
}

/// All packets of one exposure with its shared configuration.
#[derive(Debug, Clone)]
pub struct ExposureData {
    pub config: ExposureConfig,
    pub packets: Vec<GroupPacket>,
    pub files: Vec<LoadedSegment>,
}

/// Loader for the segment files of a single exposure and detector.
pub struct ExposureLoader;

impl ExposureLoader {
    /// Load and concatenate one or more segment files.
    ///
    /// Every file must carry an identical exposure configuration; the
    /// first mismatching field aborts the load.
    pub fn load_segments<P: AsRef<Path>>(paths: &[P]) -> Result<ExposureData> {
        let mut remaining = paths.iter();
        let first_path = remaining
            .next()
            .ok_or_else(|| Error::InsufficientData("no input segment files".to_string()))?
            .as_ref();

        // First pass establishes the exposure configuration.
        debug!("loading segment {}", first_path.display());
        let first = parse_segment_file(first_path)?;
        let config = first.config;
        let mut packets = first.packets;
        let mut files = vec![LoadedSegment {
            path: first_path.to_path_buf(),
            segment: first.segment,
            n_packets: packets.len(),
        }];

        // Subsequent passes must match it exactly.
        for path in remaining {
            let path = path.as_ref();
            debug!("loading segment {}", path.display());
            let segment = parse_segment_file(path)?;
            check_config_match(&config, &segment.config)?;
            files.push(LoadedSegment {
                path: path.to_path_buf(),
                segment: segment.segment,
                n_packets: segment.packets.len(),
            });
            packets.extend(segment.packets);
        }

        Ok(ExposureData {
            config,
            packets,
            files,
        })
    }
}

fn check_config_match(first: &ExposureConfig, other: &ExposureConfig) -> Result<()> {
    let mismatch = |field| Err(Error::ConfigMismatch { field });
    if first.n_integrations != other.n_integrations {
        return mismatch("n_integrations");
    }
    if first.n_groups != other.n_groups {
        return mismatch("n_groups");
    }
    if first.n_frames != other.n_frames {
        return mismatch("n_frames");
    }
    if first.group_gap != other.group_gap {
        return mismatch("group_gap");
    }
    if first.n_resets != other.n_resets {
        return mismatch("n_resets");
    }
    if first.frame_time != other.frame_time {
        return mismatch("frame_time");
    }
    if first.barycentric_time_delta != other.barycentric_time_delta {
        return mismatch("barycentric_time_delta");
    }
    Ok(())
}

const ISO_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Write the per-packet diagnostic table: observed packets with their
/// derived frame index, cumulative time, model time, and residual.
pub fn write_group_diagnostics_csv(path: &Path, fit: &TimingFit) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "integration_number",
        "group_number",
        "rfi",
        "group_end_time",
        "delta_time",
        "model_time",
        "resid",
    ])?;
    for sample in &fit.samples {
        writer.write_record([
            sample.integration.to_string(),
            sample.group.to_string(),
            sample.rfi.to_string(),
            sample.end_time.format(ISO_MILLIS).to_string(),
            sample.delta_time.to_string(),
            sample.model_time.to_string(),
            sample.residual.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the calculated per-integration time table.
pub fn write_integration_times_csv(path: &Path, timings: &[IntegrationTiming]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "integration_number",
        "int_start_MJD_UTC",
        "int_mid_MJD_UTC",
        "int_end_MJD_UTC",
        "int_start_BJD_UTC",
        "int_mid_BJD_UTC",
        "int_end_BJD_UTC",
        "int_start_utc",
        "int_end_utc",
    ])?;
    for timing in timings {
        writer.write_record([
            timing.integration.to_string(),
            timing.start_mjd_utc.value().to_string(),
            timing.mid_mjd_utc.value().to_string(),
            timing.end_mjd_utc.value().to_string(),
            timing.start_bjd_utc.value().to_string(),
            timing.mid_bjd_utc.value().to_string(),
            timing.end_bjd_utc.value().to_string(),
            timing.start_utc.format(ISO_MILLIS).to_string(),
            timing.end_utc.format(ISO_MILLIS).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
