//! Domain models for exposure frame timing.
//!
//! These are plain value records: created when input files are parsed,
//! consumed by the timing reconciliation engine, and never shared or
//! mutated across runs.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::time::mjd::ModifiedJulianDate;

/// Frame timing parameters of one exposure, as recorded in the primary
/// header of every segment belonging to that exposure.
///
/// All segments contributing packets to a single reconciliation run must
/// carry an identical configuration; the loader rejects mismatches.
///
/// # Examples
///
/// ```
/// use jwst_rust::core::domain::ExposureConfig;
///
/// let config = ExposureConfig {
///     n_integrations: 3,
///     n_groups: 4,
///     n_frames: 2,
///     group_gap: 0,
///     n_resets: 1,
///     frame_time: 10.73677,
///     barycentric_time_delta: 120.0,
/// };
///
/// assert_eq!(config.frames_per_integration(), 9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureConfig {
    /// Number of integrations in the exposure (NINTS)
    pub n_integrations: i64,
    /// Groups per integration (NGROUPS)
    pub n_groups: i64,
    /// Frames averaged or co-added per group (NFRAMES)
    pub n_frames: i64,
    /// Frames dropped between consecutive groups (GROUPGAP)
    pub group_gap: i64,
    /// Full-frame resets between integrations (NRESETS)
    pub n_resets: i64,
    /// Nominal per-frame duration in seconds (TFRAME)
    pub frame_time: f64,
    /// Offset to the solar-system-barycenter frame in seconds (BARTDELT)
    pub barycentric_time_delta: f64,
}

impl ExposureConfig {
    /// Number of running-frame-index steps consumed by one integration:
    /// group frames, dropped gap frames, and the trailing resets.
    pub fn frames_per_integration(&self) -> i64 {
        self.n_groups * self.n_frames + (self.n_groups - 1) * self.group_gap + self.n_resets
    }

    /// Check that all counts and durations are physical.
    pub fn validate(&self) -> Result<()> {
        if self.n_integrations < 1 {
            return Err(Error::InvalidConfig(format!(
                "n_integrations must be positive, got {}",
                self.n_integrations
            )));
        }
        if self.n_groups < 1 {
            return Err(Error::InvalidConfig(format!(
                "n_groups must be positive, got {}",
                self.n_groups
            )));
        }
        if self.n_frames < 1 {
            return Err(Error::InvalidConfig(format!(
                "n_frames must be positive, got {}",
                self.n_frames
            )));
        }
        if self.group_gap < 0 {
            return Err(Error::InvalidConfig(format!(
                "group_gap must be non-negative, got {}",
                self.group_gap
            )));
        }
        if self.n_resets < 0 {
            return Err(Error::InvalidConfig(format!(
                "n_resets must be non-negative, got {}",
                self.n_resets
            )));
        }
        if !(self.frame_time > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "frame_time must be positive, got {}",
                self.frame_time
            )));
        }
        Ok(())
    }
}

/// One observed header/footer packet from the GROUP table of a segment:
/// the instant the observatory data handling unit received the last byte
/// of a data group.
///
/// `group` 0 marks the special frame0 record valid only for the first
/// frame of an integration.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPacket {
    /// Integration index, starting at 1
    pub integration: i64,
    /// Group index, starting at 1; 0 denotes frame0
    pub group: i64,
    /// Reported end-of-group instant, UTC
    pub end_time: DateTime<Utc>,
}

/// Calculated start, middle, and end time for one integration, in UTC
/// modified Julian date and its barycentric-corrected variant.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationTiming {
    /// Integration index, starting at 1
    pub integration: i64,
    /// Integration start, UTC
    pub start_utc: DateTime<Utc>,
    /// Integration end, UTC
    pub end_utc: DateTime<Utc>,
    pub start_mjd_utc: ModifiedJulianDate,
    pub mid_mjd_utc: ModifiedJulianDate,
    pub end_mjd_utc: ModifiedJulianDate,
    pub start_bjd_utc: ModifiedJulianDate,
    pub mid_bjd_utc: ModifiedJulianDate,
    pub end_bjd_utc: ModifiedJulianDate,
}
