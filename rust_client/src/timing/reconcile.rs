//! Timing reconciliation: fit a linear time model to observed end-of-group
//! packets, then predict start/mid/end times for every integration.

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::core::domain::{ExposureConfig, GroupPacket, IntegrationTiming};
use crate::error::{Error, Result};
use crate::time::mjd::{ModifiedJulianDate, SECONDS_PER_DAY};
use crate::timing::frame_index::{frame_end_time, running_frame_index};

/// Fitted linear time model: seconds per frame and a reference point on
/// the running-frame-index scale. Immutable once fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingModel {
    /// Fitted time per frame, seconds
    pub cadence: f64,
    /// RFI adopted as the model reference
    pub reference_rfi: i64,
    /// Time at the reference RFI, seconds relative to the run epoch
    pub reference_time: f64,
}

impl TimingModel {
    /// Model time at the end of the specified running frame, in seconds
    /// relative to the run epoch.
    pub fn frame_end_time(&self, rfi: i64) -> f64 {
        frame_end_time(rfi, self.reference_rfi, self.reference_time, self.cadence)
    }
}

/// One observed packet with the quantities derived while fitting.
#[derive(Debug, Clone)]
pub struct FitSample {
    pub integration: i64,
    pub group: i64,
    pub rfi: i64,
    /// Reported end-of-group instant, UTC
    pub end_time: DateTime<Utc>,
    /// Seconds since the run epoch
    pub delta_time: f64,
    /// Model prediction at this sample's RFI, seconds
    pub model_time: f64,
    /// `delta_time - model_time`, seconds
    pub residual: f64,
}

/// Residual summary for one group index across all integrations.
#[derive(Debug, Clone)]
pub struct GroupResidualStats {
    pub group: i64,
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    /// Standard deviation divided by the sample count
    pub mean_err: f64,
    pub std_dev: f64,
    pub max: f64,
}

/// Result of one fit: the model, the absolute epoch it is anchored to
/// (the first packet's timestamp), and diagnostic tables.
#[derive(Debug, Clone)]
pub struct TimingFit {
    pub model: TimingModel,
    /// Absolute UTC instant corresponding to model time zero reference
    pub epoch: DateTime<Utc>,
    pub samples: Vec<FitSample>,
    pub group_stats: Vec<GroupResidualStats>,
}

fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let d = later.signed_duration_since(earlier);
    d.num_seconds() as f64 + f64::from(d.subsec_nanos()) * 1e-9
}

fn offset_by_seconds(epoch: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    epoch + Duration::nanoseconds((seconds * 1e9).round() as i64)
}

/// Fit a linear time model to observed end-of-group packets.
///
/// The cadence is a two-point slope through the first and last packet on
/// the RFI scale; intermediate timestamps contribute only to the residual
/// diagnostics and to the bias correction that zero-centers the residual
/// distribution. Endpoint outliers therefore shift the fit; see the
/// residual statistics on the returned [`TimingFit`] to judge the fit.
///
/// Fails eagerly with [`Error::InsufficientData`] when fewer than two
/// packets are supplied or all packets share one running frame index;
/// prediction from a successful fit cannot fail.
pub fn fit_timing_model(packets: &[GroupPacket], config: &ExposureConfig) -> Result<TimingFit> {
    config.validate()?;
    if packets.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "at least 2 group packets are required, got {}",
            packets.len()
        )));
    }

    let rfi = packets
        .iter()
        .map(|p| running_frame_index(p.integration, p.group, config))
        .collect::<Result<Vec<i64>>>()?;

    // Cumulative time of each packet relative to the first one.
    let epoch = packets[0].end_time;
    let delta_time: Vec<f64> = packets
        .iter()
        .map(|p| seconds_between(p.end_time, epoch))
        .collect();

    let first = 0;
    let last = packets.len() - 1;
    let rfi_span = rfi[last] - rfi[first];
    if rfi_span == 0 {
        return Err(Error::InsufficientData(format!(
            "all packets share running frame index {}, zero-width fit",
            rfi[first]
        )));
    }

    // Apparent frame cadence from the endpoints.
    let cadence = (delta_time[last] - delta_time[first]) / rfi_span as f64;
    info!(
        "measured frame cadence={:.8} s, nominal frame_time={} s",
        cadence, config.frame_time
    );

    let mut model = TimingModel {
        cadence,
        reference_rfi: rfi[first],
        reference_time: delta_time[first],
    };

    // Shift the reference time so residuals are zero on average. The
    // cadence stays fixed from the endpoint estimate.
    let residual_sum: f64 = rfi
        .iter()
        .zip(&delta_time)
        .map(|(&r, &dt)| dt - model.frame_end_time(r))
        .sum();
    model.reference_time += residual_sum / packets.len() as f64;

    let samples: Vec<FitSample> = packets
        .iter()
        .zip(rfi.iter().zip(&delta_time))
        .map(|(p, (&r, &dt))| {
            let model_time = model.frame_end_time(r);
            FitSample {
                integration: p.integration,
                group: p.group,
                rfi: r,
                end_time: p.end_time,
                delta_time: dt,
                model_time,
                residual: dt - model_time,
            }
        })
        .collect();

    let group_stats = residual_stats_by_group(&samples);

    Ok(TimingFit {
        model,
        epoch,
        samples,
        group_stats,
    })
}

/// Summarize residuals per group index, ascending by group.
fn residual_stats_by_group(samples: &[FitSample]) -> Vec<GroupResidualStats> {
    let mut groups: Vec<i64> = samples.iter().map(|s| s.group).collect();
    groups.sort_unstable();
    groups.dedup();

    groups
        .into_iter()
        .map(|g| {
            let residuals: Vec<f64> = samples
                .iter()
                .filter(|s| s.group == g)
                .map(|s| s.residual)
                .collect();
            let count = residuals.len();
            let min = residuals.iter().copied().fold(f64::INFINITY, f64::min);
            let max = residuals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = residuals.iter().sum::<f64>() / count as f64;
            let variance =
                residuals.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / count as f64;
            let std_dev = variance.sqrt();
            GroupResidualStats {
                group: g,
                count,
                min,
                mean,
                mean_err: std_dev / count as f64,
                std_dev,
                max,
            }
        })
        .collect()
}

/// Predict start, middle, and end times for every integration in the
/// exposure, including integrations with no observed packet.
///
/// Returns exactly `config.n_integrations` records ordered by ascending
/// integration index. Start times back up from the end of the first group
/// by the duration of its frame-accumulation window; midpoints are the
/// arithmetic mean of the start and end MJD values. The barycentric
/// variant adds `barycentric_time_delta` converted to days.
pub fn predict_integration_times(
    fit: &TimingFit,
    config: &ExposureConfig,
) -> Result<Vec<IntegrationTiming>> {
    let bart_days = config.barycentric_time_delta / SECONDS_PER_DAY;
    let mut timings = Vec::with_capacity(config.n_integrations as usize);

    for integration in 1..=config.n_integrations {
        let rfi_first_group = running_frame_index(integration, 1, config)?;
        let rfi_last_group = running_frame_index(integration, config.n_groups, config)?;

        let start_secs =
            fit.model.frame_end_time(rfi_first_group) - config.n_frames as f64 * fit.model.cadence;
        let end_secs = fit.model.frame_end_time(rfi_last_group);

        let start_utc = offset_by_seconds(fit.epoch, start_secs);
        let end_utc = offset_by_seconds(fit.epoch, end_secs);

        let start_mjd = ModifiedJulianDate::from_utc(start_utc);
        let end_mjd = ModifiedJulianDate::from_utc(end_utc);
        let mid_mjd = ModifiedJulianDate::new((start_mjd.value() + end_mjd.value()) / 2.0);

        timings.push(IntegrationTiming {
            integration,
            start_utc,
            end_utc,
            start_mjd_utc: start_mjd,
            mid_mjd_utc: mid_mjd,
            end_mjd_utc: end_mjd,
            start_bjd_utc: ModifiedJulianDate::new(start_mjd.value() + bart_days),
            mid_bjd_utc: ModifiedJulianDate::new(mid_mjd.value() + bart_days),
            end_bjd_utc: ModifiedJulianDate::new(end_mjd.value() + bart_days),
        });
    }

    Ok(timings)
}
