//! Running frame index: a linear frame-counting scale over an exposure.

use crate::core::domain::ExposureConfig;
use crate::error::{Error, Result};

/// Calculate the running frame index for the last frame of a group.
///
/// The running frame index (RFI) begins at 1 for the first frame of the
/// first group of the first integration. It increments for every frame
/// that contributes to a group, every dropped frame in a group gap, and
/// every full-frame reset between integrations, so it increases
/// monotonically throughout an exposure. To first order, elapsed time in
/// an exposure is linearly proportional to RFI, which makes it the
/// independent variable for the timing model.
///
/// `group` 0 denotes the frame0 marker, valid only for the first frame of
/// an integration. No upper bound is enforced against the configured
/// integration or group counts: callers deliberately query indices past
/// the observed set when predicting unobserved integrations.
pub fn running_frame_index(integration: i64, group: i64, config: &ExposureConfig) -> Result<i64> {
    if integration < 1 || group < 0 {
        return Err(Error::InvalidIndex { integration, group });
    }
    let frames_per_int = config.frames_per_integration();
    let rfi = if group == 0 {
        (integration - 1) * frames_per_int + 1
    } else {
        (integration - 1) * frames_per_int + group * config.n_frames + (group - 1) * config.group_gap
    };
    Ok(rfi)
}

/// Time at the end of the specified running frame, relative to the model
/// reference, in seconds.
///
/// Pure linear extrapolation; valid for RFI values outside the observed
/// range.
pub fn frame_end_time(rfi: i64, reference_rfi: i64, reference_time: f64, cadence: f64) -> f64 {
    reference_time + cadence * (rfi - reference_rfi) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(n_groups: i64, n_frames: i64, group_gap: i64, n_resets: i64) -> ExposureConfig {
        ExposureConfig {
            n_integrations: 10,
            n_groups,
            n_frames,
            group_gap,
            n_resets,
            frame_time: 1.0,
            barycentric_time_delta: 0.0,
        }
    }

    #[test]
    fn rfi_matches_worked_example() {
        // frames_per_integration = 4*2 + 3*0 + 1 = 9
        let cfg = config(4, 2, 0, 1);
        assert_eq!(running_frame_index(2, 4, &cfg).unwrap(), 17);
        assert_eq!(running_frame_index(1, 1, &cfg).unwrap(), 2);
    }

    #[test]
    fn first_frame0_is_one() {
        for cfg in [config(4, 2, 0, 1), config(1, 1, 0, 0), config(5, 4, 2, 3)] {
            assert_eq!(running_frame_index(1, 0, &cfg).unwrap(), 1);
        }
    }

    #[test]
    fn out_of_domain_indices_are_rejected() {
        let cfg = config(4, 2, 0, 1);
        assert!(matches!(
            running_frame_index(0, 1, &cfg),
            Err(Error::InvalidIndex { .. })
        ));
        assert!(matches!(
            running_frame_index(1, -1, &cfg),
            Err(Error::InvalidIndex { .. })
        ));
    }

    #[test]
    fn queries_past_the_observed_set_are_allowed() {
        let cfg = config(4, 2, 0, 1);
        // Integration 11 is beyond n_integrations = 10.
        let rfi = running_frame_index(11, 4, &cfg).unwrap();
        assert_eq!(rfi, 10 * 9 + 4 * 2);
    }

    #[test]
    fn frame_end_time_is_linear() {
        assert_eq!(frame_end_time(10, 10, 5.0, 2.0), 5.0);
        assert_eq!(frame_end_time(13, 10, 5.0, 2.0), 11.0);
        assert_eq!(frame_end_time(7, 10, 5.0, 2.0), -1.0);
    }

    proptest! {
        /// RFI is non-decreasing in lexicographic (integration, group)
        /// order, and strictly increasing between distinct real frames
        /// (group > 0).
        #[test]
        fn rfi_is_monotonic(
            n_groups in 1i64..6,
            n_frames in 1i64..6,
            group_gap in 0i64..4,
            n_resets in 0i64..4,
            i1 in 1i64..6,
            i2 in 1i64..6,
            g1 in 0i64..6,
            g2 in 0i64..6,
        ) {
            let cfg = config(n_groups, n_frames, group_gap, n_resets);
            let g1 = g1.min(n_groups);
            let g2 = g2.min(n_groups);
            let (lo, hi) = if (i1, g1) <= (i2, g2) {
                ((i1, g1), (i2, g2))
            } else {
                ((i2, g2), (i1, g1))
            };
            let rfi_lo = running_frame_index(lo.0, lo.1, &cfg).unwrap();
            let rfi_hi = running_frame_index(hi.0, hi.1, &cfg).unwrap();
            prop_assert!(rfi_lo <= rfi_hi);
            if lo != hi && lo.1 > 0 && hi.1 > 0 {
                prop_assert!(rfi_lo < rfi_hi);
            }
        }
    }
}
