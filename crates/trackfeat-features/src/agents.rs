//! Agent history preprocessing.
//!
//! Turns per-frame detection tensors of varying population into one
//! `[frames, agents, 8]` feature tensor:
//!
//! 1. [`filter_agents_tensor`] keeps the identities of a reference frame,
//!    in that frame's row order.
//! 2. [`pad_agent_states`] fills frames where a canonical identity is
//!    missing by holding its nearest state.
//! 3. [`convert_absolute_quantities_to_relative`] moves every row into the
//!    anchor ego frame.
//! 4. [`compute_yaw_rate_from_state_tensors`] differentiates headings.
//! 5. [`pack_agents_tensor`] assembles the feature rows.
//!
//! [`build_ego_features_from_tensor`] is the ego-side counterpart of 3
//! and 5.

use indexmap::IndexMap;
use log::trace;
use trackfeat_core::{FeatureError, StateSE2, TrackId};

use crate::geometry::{wrap_angle, LocalFrame};
use crate::index::{AgentFeatureIndex, AgentInternalIndex, EgoFeatureIndex, EgoInternalIndex};
use crate::tensor::Tensor;

fn check_agent_frame(frame: &Tensor, index: usize) -> Result<(), FeatureError> {
    if frame.rank() != 2 || frame.dim(1) != AgentInternalIndex::DIM {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "agent frame {index} has shape {:?}, expected [_, {}]",
                frame.shape(),
                AgentInternalIndex::DIM
            ),
        });
    }
    Ok(())
}

fn check_agent_frames(frames: &[Tensor]) -> Result<(), FeatureError> {
    if frames.is_empty() {
        return Err(FeatureError::TooFewFrames { got: 0, min: 1 });
    }
    for (i, frame) in frames.iter().enumerate() {
        check_agent_frame(frame, i)?;
    }
    Ok(())
}

fn row_track_id(row: &[f64]) -> Result<TrackId, FeatureError> {
    let raw = row[AgentInternalIndex::TRACK_TOKEN];
    TrackId::from_f64(raw).ok_or_else(|| FeatureError::ShapeMismatch {
        reason: format!("track token column holds {raw}, not a track id"),
    })
}

/// Identity → row position, in the reference frame's row order.
fn canonical_rows(reference: &Tensor) -> Result<IndexMap<TrackId, usize>, FeatureError> {
    let mut rows = IndexMap::with_capacity(reference.nrows());
    for row in reference.rows() {
        let next = rows.len();
        rows.entry(row_track_id(row)?).or_insert(next);
    }
    Ok(rows)
}

/// Frame indices in traversal order: reference frame first.
fn traversal_order(len: usize, reverse: bool) -> Vec<usize> {
    if reverse {
        (0..len).rev().collect()
    } else {
        (0..len).collect()
    }
}

/// Keep only the agents present in the reference frame.
///
/// The reference frame is the last frame if `reverse`, else the first.
/// Every output frame holds the rows of canonical identities it
/// contains, ordered as in the reference frame. A frame may come out
/// shorter than the reference; [`pad_agent_states`] fills the gaps.
///
/// If the reference frame is empty every output frame is `[0, 8]`.
pub fn filter_agents_tensor(agents: &[Tensor], reverse: bool) -> Result<Vec<Tensor>, FeatureError> {
    check_agent_frames(agents)?;
    let reference = if reverse {
        &agents[agents.len() - 1]
    } else {
        &agents[0]
    };
    let canonical = canonical_rows(reference)?;

    let mut filtered = Vec::with_capacity(agents.len());
    for (frame_idx, frame) in agents.iter().enumerate() {
        let mut slots: Vec<Option<&[f64]>> = vec![None; canonical.len()];
        let mut dropped = 0usize;
        for row in frame.rows() {
            match canonical.get(&row_track_id(row)?) {
                Some(&pos) => slots[pos] = Some(row),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            trace!("frame {frame_idx}: dropped {dropped} non-canonical agents");
        }
        let rows: Vec<&[f64]> = slots.into_iter().flatten().collect();
        filtered.push(Tensor::from_rows(&rows, AgentInternalIndex::DIM)?);
    }
    Ok(filtered)
}

/// Fill missing rows by holding each agent's nearest known state.
///
/// Frames are visited starting at the reference frame (the last frame
/// if `reverse`, else the first) and moving away from it. Each visited
/// frame overwrites the held state of the agents it contains, and every
/// output frame is a copy of the held state at that point. So with
/// `reverse = true` a gap takes the state from the nearest later frame,
/// and an agent first seen in the reference frame is back-filled from
/// it. Output frames all have the reference frame's rows, in its order.
///
/// Rows whose identity is not in the reference frame are ignored.
pub fn pad_agent_states(
    agent_trajectories: &[Tensor],
    reverse: bool,
) -> Result<Vec<Tensor>, FeatureError> {
    check_agent_frames(agent_trajectories)?;
    let order = traversal_order(agent_trajectories.len(), reverse);
    let canonical = canonical_rows(&agent_trajectories[order[0]])?;

    let mut held = Tensor::zeros(&[canonical.len(), AgentInternalIndex::DIM]);
    let mut padded = vec![Tensor::zeros(&[0, AgentInternalIndex::DIM]); agent_trajectories.len()];
    for idx in order {
        let frame = &agent_trajectories[idx];
        let mut seen = 0usize;
        for row in frame.rows() {
            if let Some(&pos) = canonical.get(&row_track_id(row)?) {
                held.row_mut(pos).copy_from_slice(row);
                seen += 1;
            }
        }
        if seen < canonical.len() {
            trace!(
                "frame {idx}: holding {} of {} agents",
                canonical.len() - seen,
                canonical.len()
            );
        }
        padded[idx] = held.clone();
    }
    Ok(padded)
}

fn anchor_pose(anchor_ego_state: &[f64]) -> Result<StateSE2, FeatureError> {
    if anchor_ego_state.len() < EgoInternalIndex::DIM {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "anchor ego state has {} values, expected {}",
                anchor_ego_state.len(),
                EgoInternalIndex::DIM
            ),
        });
    }
    Ok(StateSE2::new(
        anchor_ego_state[EgoInternalIndex::X],
        anchor_ego_state[EgoInternalIndex::Y],
        anchor_ego_state[EgoInternalIndex::HEADING],
    ))
}

/// Express one frame of agent rows relative to the anchor ego pose.
///
/// Positions are translated then rotated, headings are differenced and
/// wrapped into `(-pi, pi]`, and velocities are rotated only. Identity,
/// width and length pass through.
pub fn convert_absolute_quantities_to_relative(
    agent_state: &Tensor,
    anchor_ego_state: &[f64],
) -> Result<Tensor, FeatureError> {
    check_agent_frame(agent_state, 0)?;
    let frame = LocalFrame::new(anchor_pose(anchor_ego_state)?);

    let mut out = agent_state.clone();
    for i in 0..out.nrows() {
        let row = out.row_mut(i);
        let pose = frame.pose_to_local(StateSE2::new(
            row[AgentInternalIndex::X],
            row[AgentInternalIndex::Y],
            row[AgentInternalIndex::HEADING],
        ));
        let (vx, vy) =
            frame.rotate_to_local(row[AgentInternalIndex::VX], row[AgentInternalIndex::VY]);
        row[AgentInternalIndex::X] = pose.x;
        row[AgentInternalIndex::Y] = pose.y;
        row[AgentInternalIndex::HEADING] = pose.heading;
        row[AgentInternalIndex::VX] = vx;
        row[AgentInternalIndex::VY] = vy;
    }
    Ok(out)
}

/// Yaw rate per frame and agent, `[frames, agents]`, in rad/s.
///
/// `agent_states` must be padded (equal row counts, aligned rows) and
/// `time_stamps` is `[frames]` in microseconds. For `t >= 1` the rate is
/// the wrapped heading change over the elapsed time; a non-positive or
/// non-finite elapsed time gives 0. Frame 0 reuses frame 1's rate, and a
/// single frame gives all zeros.
pub fn compute_yaw_rate_from_state_tensors(
    agent_states: &[Tensor],
    time_stamps: &Tensor,
) -> Result<Tensor, FeatureError> {
    check_agent_frames(agent_states)?;
    let frames = agent_states.len();
    let agents = agent_states[0].nrows();
    if let Some((i, f)) = agent_states
        .iter()
        .enumerate()
        .find(|(_, f)| f.nrows() != agents)
    {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "agent frame {i} has {} rows, frame 0 has {agents}; pad before computing yaw rate",
                f.nrows()
            ),
        });
    }
    if time_stamps.shape() != [frames] {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "time stamps have shape {:?}, expected [{frames}]",
                time_stamps.shape()
            ),
        });
    }

    let ts = time_stamps.data();
    let mut yaw_rates = Tensor::zeros(&[frames, agents]);
    for t in 1..frames {
        let dt = (ts[t] - ts[t - 1]) * 1e-6;
        if !(dt.is_finite() && dt > 0.0) {
            continue;
        }
        let (prev, curr) = (&agent_states[t - 1], &agent_states[t]);
        let out = yaw_rates.row_mut(t);
        for (a, rate) in out.iter_mut().enumerate() {
            let delta = wrap_angle(
                curr.row(a)[AgentInternalIndex::HEADING] - prev.row(a)[AgentInternalIndex::HEADING],
            );
            *rate = delta / dt;
        }
    }
    if frames >= 2 {
        let first_computable = yaw_rates.row(1).to_vec();
        yaw_rates.row_mut(0).copy_from_slice(&first_computable);
    }
    Ok(yaw_rates)
}

/// Assemble `[frames, agents, 8]` agent features.
///
/// `padded_agents_tensors` are the relative, padded frames and
/// `yaw_rates` is the matching `[frames, agents]` tensor.
pub fn pack_agents_tensor(
    padded_agents_tensors: &[Tensor],
    yaw_rates: &Tensor,
) -> Result<Tensor, FeatureError> {
    check_agent_frames(padded_agents_tensors)?;
    let frames = padded_agents_tensors.len();
    let agents = padded_agents_tensors[0].nrows();
    if yaw_rates.shape() != [frames, agents] {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "yaw rates have shape {:?}, expected [{frames}, {agents}]",
                yaw_rates.shape()
            ),
        });
    }

    let mut per_frame = Vec::with_capacity(frames);
    for (t, frame) in padded_agents_tensors.iter().enumerate() {
        if frame.nrows() != agents {
            return Err(FeatureError::ShapeMismatch {
                reason: format!("agent frame {t} has {} rows, expected {agents}", frame.nrows()),
            });
        }
        let rates = yaw_rates.row(t);
        let mut out = Tensor::zeros(&[agents, AgentFeatureIndex::DIM]);
        for (a, src) in frame.rows().enumerate() {
            let dst = out.row_mut(a);
            dst[AgentFeatureIndex::X] = src[AgentInternalIndex::X];
            dst[AgentFeatureIndex::Y] = src[AgentInternalIndex::Y];
            dst[AgentFeatureIndex::HEADING] = src[AgentInternalIndex::HEADING];
            dst[AgentFeatureIndex::VX] = src[AgentInternalIndex::VX];
            dst[AgentFeatureIndex::VY] = src[AgentInternalIndex::VY];
            dst[AgentFeatureIndex::YAW_RATE] = rates[a];
            dst[AgentFeatureIndex::LENGTH] = src[AgentInternalIndex::LENGTH];
            dst[AgentFeatureIndex::WIDTH] = src[AgentInternalIndex::WIDTH];
        }
        per_frame.push(out);
    }
    Tensor::stack(&per_frame)
}

/// Ego features `[frames, 7]` relative to the anchor ego state.
///
/// The anchor is the last row if `reverse`, else the first. Poses are
/// transformed; velocity and acceleration are rotated.
pub fn build_ego_features_from_tensor(
    ego_trajectory: &Tensor,
    reverse: bool,
) -> Result<Tensor, FeatureError> {
    if ego_trajectory.rank() != 2
        || ego_trajectory.dim(1) != EgoInternalIndex::DIM
        || ego_trajectory.nrows() == 0
    {
        return Err(FeatureError::ShapeMismatch {
            reason: format!(
                "ego trajectory has shape {:?}, expected [>0, {}]",
                ego_trajectory.shape(),
                EgoInternalIndex::DIM
            ),
        });
    }
    let anchor_row = if reverse {
        ego_trajectory.nrows() - 1
    } else {
        0
    };
    let frame = LocalFrame::new(anchor_pose(ego_trajectory.row(anchor_row))?);

    let mut ego = Tensor::zeros(&[ego_trajectory.nrows(), EgoFeatureIndex::DIM]);
    for (i, src) in ego_trajectory.rows().enumerate() {
        let pose = frame.pose_to_local(StateSE2::new(
            src[EgoInternalIndex::X],
            src[EgoInternalIndex::Y],
            src[EgoInternalIndex::HEADING],
        ));
        let (vx, vy) = frame.rotate_to_local(src[EgoInternalIndex::VX], src[EgoInternalIndex::VY]);
        let (ax, ay) = frame.rotate_to_local(src[EgoInternalIndex::AX], src[EgoInternalIndex::AY]);
        let dst = ego.row_mut(i);
        dst[EgoFeatureIndex::X] = pose.x;
        dst[EgoFeatureIndex::Y] = pose.y;
        dst[EgoFeatureIndex::HEADING] = pose.heading;
        dst[EgoFeatureIndex::VX] = vx;
        dst[EgoFeatureIndex::VY] = vy;
        dst[EgoFeatureIndex::AX] = ax;
        dst[EgoFeatureIndex::AY] = ay;
    }
    Ok(ego)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const W: usize = AgentInternalIndex::DIM;

    /// Agent row with `x` doubling as a per-frame marker.
    fn row(id: u32, x: f64, heading: f64) -> [f64; W] {
        let mut r = [0.0; W];
        r[AgentInternalIndex::TRACK_TOKEN] = f64::from(id);
        r[AgentInternalIndex::X] = x;
        r[AgentInternalIndex::Y] = -x;
        r[AgentInternalIndex::HEADING] = heading;
        r[AgentInternalIndex::VX] = 1.0;
        r[AgentInternalIndex::VY] = 0.5;
        r[AgentInternalIndex::WIDTH] = 2.0;
        r[AgentInternalIndex::LENGTH] = 4.0;
        r
    }

    fn frame(rows: &[[f64; W]]) -> Tensor {
        Tensor::from_rows(rows, W).unwrap()
    }

    fn ids(t: &Tensor) -> Vec<u32> {
        t.rows()
            .map(|r| r[AgentInternalIndex::TRACK_TOKEN] as u32)
            .collect()
    }

    fn xs(t: &Tensor) -> Vec<f64> {
        t.rows().map(|r| r[AgentInternalIndex::X]).collect()
    }

    fn ego_row(x: f64, y: f64, heading: f64) -> [f64; EgoInternalIndex::DIM] {
        let mut r = [0.0; EgoInternalIndex::DIM];
        r[EgoInternalIndex::X] = x;
        r[EgoInternalIndex::Y] = y;
        r[EgoInternalIndex::HEADING] = heading;
        r
    }

    // ── filter ───────────────────────────────────────────────

    #[test]
    fn filter_uses_reference_order_and_drops_others() {
        let agents = vec![
            frame(&[row(2, 0.0, 0.0), row(9, 0.0, 0.0), row(1, 0.0, 0.0)]),
            frame(&[row(1, 1.0, 0.0), row(2, 1.0, 0.0)]),
        ];
        let filtered = filter_agents_tensor(&agents, true).unwrap();
        assert_eq!(ids(&filtered[0]), vec![1, 2]);
        assert_eq!(ids(&filtered[1]), vec![1, 2]);
    }

    #[test]
    fn filter_forward_uses_first_frame() {
        let agents = vec![
            frame(&[row(3, 0.0, 0.0)]),
            frame(&[row(4, 1.0, 0.0), row(3, 1.0, 0.0)]),
        ];
        let filtered = filter_agents_tensor(&agents, false).unwrap();
        assert_eq!(ids(&filtered[0]), vec![3]);
        assert_eq!(ids(&filtered[1]), vec![3]);
    }

    #[test]
    fn filter_empty_reference_gives_empty_frames() {
        let agents = vec![
            frame(&[row(1, 0.0, 0.0)]),
            frame(&[row(1, 1.0, 0.0), row(2, 1.0, 0.0)]),
            Tensor::zeros(&[0, W]),
        ];
        let filtered = filter_agents_tensor(&agents, true).unwrap();
        assert_eq!(filtered.len(), 3);
        for f in &filtered {
            assert_eq!(f.shape(), &[0, W]);
        }
    }

    #[test]
    fn filter_rejects_bad_width_and_no_frames() {
        assert!(filter_agents_tensor(&[], true).is_err());
        let bad = vec![Tensor::zeros(&[1, 3])];
        assert!(matches!(
            filter_agents_tensor(&bad, true),
            Err(FeatureError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn filter_rejects_bad_track_column() {
        let mut r = row(1, 0.0, 0.0);
        r[AgentInternalIndex::TRACK_TOKEN] = -3.0;
        assert!(filter_agents_tensor(&[frame(&[r])], true).is_err());
    }

    // ── pad ──────────────────────────────────────────────────

    #[test]
    fn pad_gap_and_late_appearance() {
        // A (id 0) seen in frames 0, 1, 3; B (id 1) only in frame 3.
        let agents = vec![
            frame(&[row(0, 0.0, 0.0)]),
            frame(&[row(0, 1.0, 0.0)]),
            Tensor::zeros(&[0, W]),
            frame(&[row(0, 3.0, 0.0), row(1, 30.0, 0.0)]),
        ];
        let filtered = filter_agents_tensor(&agents, true).unwrap();
        let padded = pad_agent_states(&filtered, true).unwrap();

        assert_eq!(padded.len(), 4);
        for f in &padded {
            assert_eq!(ids(f), vec![0, 1]);
        }
        assert_eq!(xs(&padded[0]), vec![0.0, 30.0]);
        assert_eq!(xs(&padded[1]), vec![1.0, 30.0]);
        // Gap held from the nearest later frame.
        assert_eq!(xs(&padded[2]), vec![3.0, 30.0]);
        assert_eq!(xs(&padded[3]), vec![3.0, 30.0]);
    }

    #[test]
    fn pad_forward_holds_earlier_state() {
        let agents = vec![
            frame(&[row(0, 0.0, 0.0)]),
            Tensor::zeros(&[0, W]),
            frame(&[row(0, 2.0, 0.0)]),
        ];
        let padded = pad_agent_states(&agents, false).unwrap();
        assert_eq!(xs(&padded[1]), vec![0.0]);
        assert_eq!(xs(&padded[2]), vec![2.0]);
    }

    #[test]
    fn pad_empty_reference() {
        let agents = vec![frame(&[row(0, 0.0, 0.0)]), Tensor::zeros(&[0, W])];
        let padded = pad_agent_states(&agents, true).unwrap();
        assert!(padded.iter().all(|f| f.shape() == [0, W]));
    }

    #[test]
    fn empty_first_frame_is_empty_reference_going_forward() {
        let agents = vec![
            Tensor::zeros(&[0, W]),
            frame(&[row(1, 1.0, 0.0)]),
            frame(&[row(1, 2.0, 0.0), row(2, 2.0, 0.0)]),
        ];
        let filtered = filter_agents_tensor(&agents, false).unwrap();
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|f| f.shape() == [0, W]));

        let padded = pad_agent_states(&agents, false).unwrap();
        assert_eq!(padded.len(), 3);
        assert!(padded.iter().all(|f| f.shape() == [0, W]));

        let padded = pad_agent_states(&filtered, false).unwrap();
        assert!(padded.iter().all(|f| f.shape() == [0, W]));
    }

    proptest! {
        #[test]
        fn pad_is_identity_for_fully_observed_agents(
            frames in 1usize..6,
            agents in 0usize..5,
            seed in 0u32..1000,
        ) {
            let input: Vec<Tensor> = (0..frames)
                .map(|t| {
                    let rows: Vec<[f64; W]> = (0..agents)
                        .map(|a| row(a as u32, f64::from(seed) + (t * 10 + a) as f64, 0.1 * t as f64))
                        .collect();
                    frame(&rows)
                })
                .collect();
            for reverse in [true, false] {
                let padded = pad_agent_states(&input, reverse).unwrap();
                prop_assert_eq!(&padded, &input);
            }
        }

        #[test]
        fn filter_then_pad_matches_reference_order(
            ids_last in proptest::collection::vec(0u32..20, 0..8),
            ids_first in proptest::collection::vec(0u32..20, 0..8),
        ) {
            let mut seen = std::collections::HashSet::new();
            let uniq_last: Vec<u32> = ids_last.into_iter().filter(|id| seen.insert(*id)).collect();
            let mut seen = std::collections::HashSet::new();
            let uniq_first: Vec<u32> = ids_first.into_iter().filter(|id| seen.insert(*id)).collect();

            let first: Vec<[f64; W]> = uniq_first.iter().map(|&id| row(id, 0.0, 0.0)).collect();
            let last: Vec<[f64; W]> = uniq_last.iter().map(|&id| row(id, 1.0, 0.0)).collect();
            let agents = vec![frame(&first), frame(&last)];

            let padded = pad_agent_states(&filter_agents_tensor(&agents, true).unwrap(), true).unwrap();
            prop_assert_eq!(padded.len(), 2);
            for f in &padded {
                prop_assert_eq!(ids(f), uniq_last.clone());
            }
        }
    }

    // ── relative transform ───────────────────────────────────

    #[test]
    fn relative_identity_at_origin() {
        let f = frame(&[row(0, 5.0, 0.3), row(1, -2.0, -1.0)]);
        let rel = convert_absolute_quantities_to_relative(&f, &ego_row(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(rel, f);
    }

    #[test]
    fn relative_quarter_turn() {
        let f = frame(&[row(7, 10.0, FRAC_PI_2)]);
        // Anchor at (10, 0) facing +y; agent at (10, -10) facing +y.
        let rel = convert_absolute_quantities_to_relative(&f, &ego_row(10.0, 0.0, FRAC_PI_2)).unwrap();
        let r = rel.row(0);
        assert!((r[AgentInternalIndex::X] - -10.0).abs() < 1e-9);
        assert!(r[AgentInternalIndex::Y].abs() < 1e-9);
        assert!(r[AgentInternalIndex::HEADING].abs() < 1e-12);
        // Velocity (1, 0.5) rotated by -pi/2 is (0.5, -1), with no translation.
        assert!((r[AgentInternalIndex::VX] - 0.5).abs() < 1e-9);
        assert!((r[AgentInternalIndex::VY] - -1.0).abs() < 1e-9);
        assert_eq!(r[AgentInternalIndex::TRACK_TOKEN], 7.0);
        assert_eq!(r[AgentInternalIndex::LENGTH], 4.0);
    }

    #[test]
    fn relative_heading_wraps() {
        let f = frame(&[row(0, 0.0, -PI + 0.1)]);
        let rel = convert_absolute_quantities_to_relative(&f, &ego_row(0.0, 0.0, PI - 0.1)).unwrap();
        let h = rel.row(0)[AgentInternalIndex::HEADING];
        assert!((h - 0.2).abs() < 1e-9);
    }

    #[test]
    fn relative_rejects_short_anchor() {
        let f = frame(&[row(0, 0.0, 0.0)]);
        assert!(convert_absolute_quantities_to_relative(&f, &[0.0, 0.0]).is_err());
    }

    // ── yaw rate ─────────────────────────────────────────────

    fn stamps(us: &[f64]) -> Tensor {
        Tensor::new(&[us.len()], us.to_vec()).unwrap()
    }

    #[test]
    fn yaw_rate_finite_difference() {
        let agents = vec![
            frame(&[row(0, 0.0, 0.0)]),
            frame(&[row(0, 0.0, 0.1)]),
            frame(&[row(0, 0.0, 0.3)]),
        ];
        let yaw = compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0, 100_000.0, 200_000.0])).unwrap();
        assert_eq!(yaw.shape(), &[3, 1]);
        assert!((yaw.row(1)[0] - 1.0).abs() < 1e-9);
        assert!((yaw.row(2)[0] - 2.0).abs() < 1e-9);
        // First frame reuses the first computable rate.
        assert_eq!(yaw.row(0), yaw.row(1));
    }

    #[test]
    fn yaw_rate_across_pi_boundary() {
        let agents = vec![frame(&[row(0, 0.0, PI - 0.05)]), frame(&[row(0, 0.0, -PI + 0.05)])];
        let yaw = compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0, 1_000_000.0])).unwrap();
        assert!((yaw.row(1)[0] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn yaw_rate_duplicate_timestamp_is_zero() {
        let agents = vec![
            frame(&[row(0, 0.0, 0.0)]),
            frame(&[row(0, 0.0, 0.5)]),
            frame(&[row(0, 0.0, 1.0)]),
        ];
        let yaw = compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0, 0.0, 500_000.0])).unwrap();
        assert_eq!(yaw.row(1)[0], 0.0);
        assert_eq!(yaw.row(0)[0], 0.0);
        assert!((yaw.row(2)[0] - 1.0).abs() < 1e-9);
        assert!(yaw.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn yaw_rate_single_frame_is_zero() {
        let agents = vec![frame(&[row(0, 0.0, 1.0)])];
        let yaw = compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0])).unwrap();
        assert_eq!(yaw.data(), &[0.0]);
    }

    #[test]
    fn yaw_rate_rejects_unpadded_and_bad_stamps() {
        let agents = vec![frame(&[row(0, 0.0, 0.0)]), Tensor::zeros(&[0, W])];
        assert!(compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0, 1.0])).is_err());
        let agents = vec![frame(&[row(0, 0.0, 0.0)]), frame(&[row(0, 0.0, 0.0)])];
        assert!(compute_yaw_rate_from_state_tensors(&agents, &stamps(&[0.0])).is_err());
    }

    // ── assembly ─────────────────────────────────────────────

    #[test]
    fn pack_agents_layout() {
        let agents = vec![frame(&[row(3, 2.0, 0.25)]), frame(&[row(3, 4.0, 0.5)])];
        let yaw = Tensor::new(&[2, 1], vec![0.7, 0.9]).unwrap();
        let packed = pack_agents_tensor(&agents, &yaw).unwrap();
        assert_eq!(packed.shape(), &[2, 1, AgentFeatureIndex::DIM]);
        assert_eq!(packed.row(1), &[4.0, -4.0, 0.5, 1.0, 0.5, 0.9, 4.0, 2.0]);
    }

    #[test]
    fn pack_agents_rejects_yaw_shape() {
        let agents = vec![frame(&[row(3, 2.0, 0.25)])];
        let yaw = Tensor::zeros(&[1, 2]);
        assert!(pack_agents_tensor(&agents, &yaw).is_err());
    }

    #[test]
    fn ego_features_relative_to_last_row() {
        let mut rows = vec![ego_row(0.0, 0.0, 0.0), ego_row(1.0, 1.0, FRAC_PI_2)];
        rows[0][EgoInternalIndex::VX] = 2.0;
        let ego = Tensor::from_rows(&rows, EgoInternalIndex::DIM).unwrap();

        let feats = build_ego_features_from_tensor(&ego, true).unwrap();
        assert_eq!(feats.shape(), &[2, EgoFeatureIndex::DIM]);
        let anchor = feats.row(1);
        assert!(anchor[EgoFeatureIndex::X].abs() < 1e-12);
        assert!(anchor[EgoFeatureIndex::Y].abs() < 1e-12);
        assert!(anchor[EgoFeatureIndex::HEADING].abs() < 1e-12);

        let past = feats.row(0);
        // (0,0) seen from (1,1) facing +y is 1 m behind and 1 m to the right.
        assert!((past[EgoFeatureIndex::X] - -1.0).abs() < 1e-9);
        assert!((past[EgoFeatureIndex::Y] - 1.0).abs() < 1e-9);
        assert!((past[EgoFeatureIndex::HEADING] - -FRAC_PI_2).abs() < 1e-9);
        // Eastward velocity points to the anchor's right.
        assert!(past[EgoFeatureIndex::VX].abs() < 1e-9);
        assert!((past[EgoFeatureIndex::VY] - -2.0).abs() < 1e-9);
    }

    #[test]
    fn ego_features_forward_anchor() {
        let ego = Tensor::from_rows(&[ego_row(5.0, 5.0, 0.0), ego_row(6.0, 5.0, 0.0)], EgoInternalIndex::DIM).unwrap();
        let feats = build_ego_features_from_tensor(&ego, false).unwrap();
        assert_eq!(feats.row(0)[EgoFeatureIndex::X], 0.0);
        assert_eq!(feats.row(1)[EgoFeatureIndex::X], 1.0);
    }

    #[test]
    fn ego_features_reject_empty() {
        assert!(build_ego_features_from_tensor(&Tensor::zeros(&[0, EgoInternalIndex::DIM]), true).is_err());
    }
}
