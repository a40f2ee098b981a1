//! Sequential point tracking through a frame sequence.
//!
//! Each step matches every live point from frame `k` into frame `k + step`;
//! the result seeds the next step. Points within one step are independent.

use std::borrow::Cow;

use piv_tracker_core::{GrayImage, PixelPoint};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::detector::PatternDetector;
use crate::error::ConfigError;
use crate::frames::FrameSource;

/// What to do with a point after a failed match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LostPolicy {
    /// Drop the point for the rest of the sequence.
    #[default]
    Stop,
    /// Search again from the last known position in the next frame.
    KeepLast,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Frame stride between matched pairs.
    pub step: usize,
    pub lost_policy: LostPolicy,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            step: 1,
            lost_policy: LostPolicy::Stop,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("frame {0} is unavailable")]
    FrameUnavailable(usize),
    #[error("frame {index} is {got_width}x{got_height}, source reports {width}x{height}")]
    FrameSizeMismatch {
        index: usize,
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error("invalid frame range {start}..={end} for {count} frames")]
    InvalidFrameRange {
        start: usize,
        end: usize,
        count: usize,
    },
}

/// Positions of one seed point over the tracked frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub seed: PixelPoint,
    /// Frame indices, starting with the seed frame.
    pub frames: Vec<usize>,
    /// Position in each frame of `frames`; `None` where the point was lost.
    pub positions: Vec<Option<PixelPoint>>,
}

impl Trajectory {
    fn new(seed: PixelPoint, start: usize) -> Self {
        Self {
            seed,
            frames: vec![start],
            positions: vec![Some(seed)],
        }
    }

    /// Last frame index with a known position.
    pub fn last_seen(&self) -> Option<usize> {
        self.frames
            .iter()
            .zip(&self.positions)
            .rev()
            .find_map(|(&f, p)| p.map(|_| f))
    }
}

pub struct Tracker {
    detector: PatternDetector,
    params: TrackerParams,
}

impl Tracker {
    pub fn new(detector: PatternDetector, params: TrackerParams) -> Result<Self, ConfigError> {
        if params.step == 0 {
            return Err(ConfigError::InvalidStep);
        }
        Ok(Self { detector, params })
    }

    pub fn detector(&self) -> &PatternDetector {
        &self.detector
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Track `seeds` (given in frame `start`) up to frame `end` inclusive.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, source, seeds), fields(seeds = seeds.len()))
    )]
    pub fn track<S: FrameSource + ?Sized>(
        &self,
        source: &S,
        start: usize,
        end: usize,
        seeds: &[PixelPoint],
    ) -> Result<Vec<Trajectory>, TrackError> {
        let count = source.frame_count();
        if start > end || end >= count {
            return Err(TrackError::InvalidFrameRange { start, end, count });
        }

        let mut trajectories: Vec<Trajectory> =
            seeds.iter().map(|&s| Trajectory::new(s, start)).collect();
        let mut current: Vec<Option<PixelPoint>> = seeds.iter().copied().map(Some).collect();

        let mut prev = load_frame(source, start)?;
        let mut index = start;
        while index + self.params.step <= end {
            let next_index = index + self.params.step;
            let next = load_frame(source, next_index)?;

            let live: Vec<(usize, PixelPoint)> = current
                .iter()
                .enumerate()
                .filter_map(|(k, p)| p.map(|p| (k, p)))
                .collect();
            let points: Vec<PixelPoint> = live.iter().map(|&(_, p)| p).collect();
            let found = self
                .detector
                .detect_many(&prev.view(), &next.view(), &points);

            let mut step_result: Vec<Option<PixelPoint>> = vec![None; seeds.len()];
            for (&(k, _), hit) in live.iter().zip(found) {
                step_result[k] = hit;
            }

            for (k, traj) in trajectories.iter_mut().enumerate() {
                let hit = step_result[k];
                traj.frames.push(next_index);
                traj.positions.push(hit);
                match (hit, self.params.lost_policy) {
                    (Some(p), _) => current[k] = Some(p),
                    (None, LostPolicy::Stop) => current[k] = None,
                    (None, LostPolicy::KeepLast) => {}
                }
            }

            log::info!(
                "frame {index} -> {next_index}: {}/{} points matched",
                step_result.iter().filter(|p| p.is_some()).count(),
                live.len()
            );

            prev = next;
            index = next_index;
        }

        Ok(trajectories)
    }
}

fn load_frame<S: FrameSource + ?Sized>(
    source: &S,
    index: usize,
) -> Result<Cow<'_, GrayImage>, TrackError> {
    let frame = source
        .frame(index)
        .ok_or(TrackError::FrameUnavailable(index))?;
    let (width, height) = source.frame_size();
    if frame.dimensions() != (width, height) {
        return Err(TrackError::FrameSizeMismatch {
            index,
            width,
            height,
            got_width: frame.width,
            got_height: frame.height,
        });
    }
    Ok(frame)
}
