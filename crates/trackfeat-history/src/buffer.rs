//! Fixed-capacity rolling history of simulation samples.
//!
//! [`SimulationHistoryBuffer`] keeps the most recent `capacity` pairs of
//! ego state and observation. Appending to a full buffer evicts the
//! oldest pair. Positions are oldest-first: `0` is the oldest retained
//! sample and `len() - 1` the present.

use std::collections::VecDeque;

use log::debug;
use trackfeat_core::{EgoState, HistorySource, Observation};

/// A bounded, oldest-first window of `(EgoState, Observation)` samples.
#[derive(Clone, Debug)]
pub struct SimulationHistoryBuffer {
    ego_states: VecDeque<EgoState>,
    observations: VecDeque<Observation>,
    capacity: usize,
    sample_interval: Option<f64>,
}

impl SimulationHistoryBuffer {
    /// Create an empty buffer holding up to `capacity` samples.
    ///
    /// `sample_interval` is the spacing between samples in seconds. If
    /// `None` it is inferred from the two most recent ego timestamps.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`. Fewer than two samples cannot describe
    /// any motion.
    pub fn new(capacity: usize, sample_interval: Option<f64>) -> Self {
        assert!(
            capacity >= 2,
            "SimulationHistoryBuffer capacity must be >= 2, got {capacity}"
        );
        Self {
            ego_states: VecDeque::with_capacity(capacity),
            observations: VecDeque::with_capacity(capacity),
            capacity,
            sample_interval,
        }
    }

    /// Create a buffer sized to hold `duration` seconds at `sample_interval`,
    /// plus the present sample.
    ///
    /// # Panics
    ///
    /// Panics if the resulting capacity is below 2.
    pub fn with_duration(duration: f64, sample_interval: f64) -> Self {
        let intervals = if duration.is_finite() && sample_interval > 0.0 {
            (duration / sample_interval).round() as usize
        } else {
            0
        };
        Self::new(intervals + 1, Some(sample_interval))
    }

    /// Build a buffer from existing oldest-first samples.
    ///
    /// Only the newest `capacity` pairs are kept. Excess entries of the
    /// longer sequence are ignored from the oldest end.
    pub fn initialize<E, O>(
        capacity: usize,
        ego_states: E,
        observations: O,
        sample_interval: Option<f64>,
    ) -> Self
    where
        E: IntoIterator<Item = EgoState>,
        O: IntoIterator<Item = Observation>,
    {
        let mut buffer = Self::new(capacity, sample_interval);
        let ego: Vec<EgoState> = ego_states.into_iter().collect();
        let obs: Vec<Observation> = observations.into_iter().collect();
        let n = ego.len().min(obs.len());
        let (skip_ego, skip_obs) = (ego.len() - n, obs.len() - n);
        buffer.extend(
            ego.into_iter()
                .skip(skip_ego)
                .zip(obs.into_iter().skip(skip_obs)),
        );
        buffer
    }

    /// Append the newest sample, returning the evicted oldest one if the
    /// buffer was full.
    pub fn append(
        &mut self,
        ego_state: EgoState,
        observation: Observation,
    ) -> Option<(EgoState, Observation)> {
        let evicted = if self.ego_states.len() == self.capacity {
            self.ego_states.pop_front().zip(self.observations.pop_front())
        } else {
            None
        };
        if let Some((old, _)) = &evicted {
            debug!(
                "history buffer evicted sample at {} us",
                old.time_point.time_us()
            );
        }
        self.ego_states.push_back(ego_state);
        self.observations.push_back(observation);
        evicted
    }

    /// Append several samples in order.
    pub fn extend<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = (EgoState, Observation)>,
    {
        for (ego, observation) in samples {
            self.append(ego, observation);
        }
    }

    /// Stored ego states, oldest first.
    pub fn ego_states(&self) -> impl Iterator<Item = &EgoState> + '_ {
        self.ego_states.iter()
    }

    /// Stored observations, oldest first.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> + '_ {
        self.observations.iter()
    }

    /// Number of stored samples (up to `capacity`).
    pub fn len(&self) -> usize {
        self.ego_states.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.ego_states.is_empty()
    }

    /// Maximum number of stored samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Drop all samples, keeping capacity and interval.
    pub fn clear(&mut self) {
        self.ego_states.clear();
        self.observations.clear();
    }

    fn inferred_interval(&self) -> Option<f64> {
        let n = self.ego_states.len();
        if n < 2 {
            return None;
        }
        let dt = self.ego_states[n - 1].time_point.time_s()
            - self.ego_states[n - 2].time_point.time_s();
        (dt > 0.0).then_some(dt)
    }
}

impl HistorySource for SimulationHistoryBuffer {
    fn len(&self) -> usize {
        self.ego_states.len()
    }

    fn ego_state(&self, index: usize) -> Option<&EgoState> {
        self.ego_states.get(index)
    }

    fn observation(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    fn sample_interval(&self) -> Option<f64> {
        self.sample_interval.or_else(|| self.inferred_interval())
    }

    /// Stored samples times the sample interval, or 0 without an interval.
    fn duration(&self) -> f64 {
        self.sample_interval()
            .map_or(0.0, |dt| self.ego_states.len() as f64 * dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfeat_core::{DetectionsTracks, StateSE2, TimePoint, Vector2D};

    fn sample(t: i64) -> (EgoState, Observation) {
        let ego = EgoState::new(
            StateSE2::new(t as f64, 0.0, 0.0),
            Vector2D::default(),
            Vector2D::default(),
            TimePoint::from_us(t * 100_000),
        );
        (ego, DetectionsTracks::default().into())
    }

    #[test]
    fn new_buffer_is_empty() {
        let buffer = SimulationHistoryBuffer::new(4, Some(0.1));
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
        assert!(buffer.current_state().is_none());
        assert_eq!(HistorySource::duration(&buffer), 0.0);
    }

    #[test]
    #[should_panic(expected = "capacity must be >= 2")]
    fn capacity_below_two_panics() {
        SimulationHistoryBuffer::new(1, None);
    }

    #[test]
    fn append_evicts_oldest() {
        let mut buffer = SimulationHistoryBuffer::new(3, Some(0.1));
        for t in 0..3 {
            let (e, o) = sample(t);
            assert!(buffer.append(e, o).is_none());
        }
        assert!(buffer.is_full());

        let (e, o) = sample(3);
        let (evicted, _) = buffer.append(e, o).unwrap();
        assert_eq!(evicted.time_point, TimePoint::from_us(0));
        assert_eq!(buffer.len(), 3);
        let xs: Vec<f64> = buffer.ego_states().map(|s| s.pose.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn current_state_is_newest() {
        let mut buffer = SimulationHistoryBuffer::new(4, None);
        buffer.extend((0..6).map(sample));
        let (ego, _) = buffer.current_state().unwrap();
        assert_eq!(ego.pose.x, 5.0);
    }

    #[test]
    fn interval_inferred_from_timestamps() {
        let mut buffer = SimulationHistoryBuffer::new(4, None);
        let (e, o) = sample(0);
        buffer.append(e, o);
        assert_eq!(buffer.sample_interval(), None);
        let (e, o) = sample(1);
        buffer.append(e, o);
        let dt = buffer.sample_interval().unwrap();
        assert!((dt - 0.1).abs() < 1e-12);
        assert!((HistorySource::duration(&buffer) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn explicit_interval_wins() {
        let mut buffer = SimulationHistoryBuffer::new(4, Some(0.05));
        buffer.extend((0..3).map(sample));
        assert_eq!(buffer.sample_interval(), Some(0.05));
    }

    #[test]
    fn with_duration_adds_present_slot() {
        let buffer = SimulationHistoryBuffer::with_duration(2.0, 0.1);
        assert_eq!(buffer.capacity(), 21);
    }

    #[test]
    fn initialize_keeps_newest() {
        let (egos, obs): (Vec<_>, Vec<_>) = (0..10).map(sample).unzip();
        let buffer = SimulationHistoryBuffer::initialize(4, egos, obs, None);
        assert_eq!(buffer.len(), 4);
        let xs: Vec<f64> = buffer.ego_states().map(|s| s.pose.x).collect();
        assert_eq!(xs, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn initialize_aligns_uneven_inputs_at_newest() {
        let egos: Vec<_> = (0..5).map(|t| sample(t).0).collect();
        let obs: Vec<_> = (0..3).map(|t| sample(t).1).collect();
        let buffer = SimulationHistoryBuffer::initialize(8, egos, obs, None);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.ego_state(0).unwrap().pose.x, 2.0);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buffer = SimulationHistoryBuffer::new(4, Some(0.1));
        buffer.extend((0..4).map(sample));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
    }
}
