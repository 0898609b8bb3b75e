//! Offsets for sampling a fixed number of past frames over a horizon.

use crate::error::SamplingError;

/// Tolerance applied before flooring `horizon / interval`, so that e.g.
/// `2.0 / 0.1` counts as 20 intervals rather than 19.
const INTERVAL_EPSILON: f64 = 1e-6;

/// Offsets (in stored samples, counted back from the present) of
/// `num_samples` frames spread evenly over `time_horizon` seconds of a
/// source sampled every `time_interval` seconds.
///
/// The result is ordered nearest-first: `[step, 2*step, ..]`, where
/// `step = floor(horizon / interval) / num_samples`. Callers wanting
/// oldest-first iterate it in reverse.
///
/// # Examples
///
/// ```
/// use trackfeat_core::sample_indices_with_time_horizon;
///
/// // 2 s of history at 10 Hz, 4 samples: every 5th stored frame.
/// let idx = sample_indices_with_time_horizon(4, 2.0, 0.1).unwrap();
/// assert_eq!(idx, vec![5, 10, 15, 20]);
/// ```
pub fn sample_indices_with_time_horizon(
    num_samples: usize,
    time_horizon: f64,
    time_interval: f64,
) -> Result<Vec<usize>, SamplingError> {
    if !time_horizon.is_finite()
        || !time_interval.is_finite()
        || time_horizon <= 0.0
        || time_interval <= 0.0
        || time_horizon + INTERVAL_EPSILON < time_interval
    {
        return Err(SamplingError::InvalidHorizon {
            time_horizon,
            time_interval,
        });
    }

    let num_intervals = (time_horizon / time_interval + INTERVAL_EPSILON).floor() as usize;
    let step = if num_samples == 0 {
        0
    } else {
        num_intervals / num_samples
    };
    if step == 0 {
        return Err(SamplingError::StepTooSmall {
            num_samples,
            num_intervals,
        });
    }

    Ok((1..=num_samples).map(|k| k * step).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn evenly_spaced() {
        assert_eq!(
            sample_indices_with_time_horizon(2, 2.0, 0.5).unwrap(),
            vec![2, 4]
        );
    }

    #[test]
    fn step_rounds_down() {
        // 7 intervals over 3 samples: step 2, the oldest interval is unused.
        assert_eq!(
            sample_indices_with_time_horizon(3, 0.7, 0.1).unwrap(),
            vec![2, 4, 6]
        );
    }

    #[test]
    fn rejects_non_positive() {
        assert!(matches!(
            sample_indices_with_time_horizon(2, 0.0, 0.1),
            Err(SamplingError::InvalidHorizon { .. })
        ));
        assert!(matches!(
            sample_indices_with_time_horizon(2, 1.0, -0.1),
            Err(SamplingError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn rejects_horizon_shorter_than_interval() {
        assert!(matches!(
            sample_indices_with_time_horizon(1, 0.05, 0.1),
            Err(SamplingError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn rejects_too_many_samples() {
        assert_eq!(
            sample_indices_with_time_horizon(5, 0.4, 0.1),
            Err(SamplingError::StepTooSmall {
                num_samples: 5,
                num_intervals: 4
            })
        );
        assert!(sample_indices_with_time_horizon(0, 1.0, 0.1).is_err());
    }

    proptest! {
        #[test]
        fn offsets_are_increasing_and_in_horizon(
            num_samples in 1usize..10,
            intervals in 1usize..100,
        ) {
            let interval = 0.1;
            let horizon = intervals as f64 * interval;
            if let Ok(idx) = sample_indices_with_time_horizon(num_samples, horizon, interval) {
                prop_assert_eq!(idx.len(), num_samples);
                prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(*idx.last().unwrap() <= intervals);
            } else {
                prop_assert!(intervals < num_samples);
            }
        }
    }
}
