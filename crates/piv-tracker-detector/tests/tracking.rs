mod common;

use common::{noise, particles};
use piv_tracker_core::{GrayImage, PixelPoint};
use piv_tracker_detector::{
    DetectorParams, FrameSource, InMemoryFrames, LostPolicy, PatternDetector, TrackError,
    Tracker, TrackerParams,
};

const CENTERS: [(f64, f64); 2] = [(30.0, 30.0), (60.0, 70.0)];

fn drifting_frames(count: usize) -> InMemoryFrames {
    let frames = (0..count)
        .map(|k| particles(&CENTERS, k as f64, 2.0 * k as f64))
        .collect();
    InMemoryFrames::new(frames, 25.0).expect("equal frame sizes")
}

fn tracker(params: TrackerParams) -> Tracker {
    let detector = PatternDetector::new(DetectorParams::default()).expect("valid");
    Tracker::new(detector, params).expect("valid tracker")
}

fn seeds() -> Vec<PixelPoint> {
    CENTERS
        .iter()
        .map(|&(r, c)| PixelPoint::new(c as i32, r as i32))
        .collect()
}

#[test]
fn follows_drifting_particles() {
    let _ = env_logger::builder().is_test(true).try_init();
    let source = drifting_frames(5);
    let trajectories = tracker(TrackerParams::default())
        .track(&source, 0, 4, &seeds())
        .expect("track");

    assert_eq!(trajectories.len(), 2);
    for (traj, seed) in trajectories.iter().zip(seeds()) {
        assert_eq!(traj.seed, seed);
        assert_eq!(traj.frames, vec![0, 1, 2, 3, 4]);
        for (k, pos) in traj.positions.iter().enumerate() {
            let k = k as i32;
            assert_eq!(*pos, Some(PixelPoint::new(seed.x + 2 * k, seed.y + k)));
        }
        assert_eq!(traj.last_seen(), Some(4));
    }
}

#[test]
fn stride_skips_intermediate_frames() {
    let source = drifting_frames(5);
    let params = TrackerParams {
        step: 2,
        ..TrackerParams::default()
    };
    let trajectories = tracker(params)
        .track(&source, 0, 4, &seeds()[..1])
        .expect("track");

    assert_eq!(trajectories[0].frames, vec![0, 2, 4]);
    assert_eq!(
        trajectories[0].positions,
        vec![
            Some(PixelPoint::new(30, 30)),
            Some(PixelPoint::new(34, 32)),
            Some(PixelPoint::new(38, 34)),
        ]
    );
}

#[test]
fn point_leaving_the_frame_stays_lost() {
    let source = drifting_frames(3);
    let mut points = seeds();
    points.push(PixelPoint::new(108, 50));

    let trajectories = tracker(TrackerParams::default())
        .track(&source, 0, 2, &points)
        .expect("track");

    assert_eq!(
        trajectories[2].positions,
        vec![Some(PixelPoint::new(108, 50)), None, None]
    );
    assert_eq!(trajectories[2].last_seen(), Some(0));
    assert!(trajectories[0].positions.iter().all(Option::is_some));
}

fn frames_with_dropout() -> InMemoryFrames {
    InMemoryFrames::new(
        vec![
            particles(&CENTERS, 0.0, 0.0),
            noise(12345),
            particles(&CENTERS, 0.0, 0.0),
            particles(&CENTERS, 1.0, 2.0),
        ],
        25.0,
    )
    .expect("frames")
}

#[test]
fn stop_policy_drops_point_after_dropout() {
    let trajectories = tracker(TrackerParams::default())
        .track(&frames_with_dropout(), 0, 3, &seeds()[..1])
        .expect("track");
    assert_eq!(
        trajectories[0].positions,
        vec![Some(PixelPoint::new(30, 30)), None, None, None]
    );
}

#[test]
fn keep_last_policy_recovers_after_dropout() {
    let params = TrackerParams {
        lost_policy: LostPolicy::KeepLast,
        ..TrackerParams::default()
    };
    let trajectories = tracker(params)
        .track(&frames_with_dropout(), 0, 3, &seeds()[..1])
        .expect("track");
    assert_eq!(
        trajectories[0].positions,
        vec![
            Some(PixelPoint::new(30, 30)),
            None,
            None,
            Some(PixelPoint::new(32, 31)),
        ]
    );
}

struct Gappy {
    inner: InMemoryFrames,
    missing: usize,
}

impl FrameSource for Gappy {
    fn frame_size(&self) -> (usize, usize) {
        self.inner.frame_size()
    }

    fn fps(&self) -> f64 {
        self.inner.fps()
    }

    fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    fn frame(&self, index: usize) -> Option<std::borrow::Cow<'_, GrayImage>> {
        if index == self.missing {
            return None;
        }
        self.inner.frame(index)
    }
}

#[test]
fn unavailable_frame_is_an_error() {
    let source = Gappy {
        inner: drifting_frames(4),
        missing: 2,
    };
    assert_eq!(
        tracker(TrackerParams::default()).track(&source, 0, 3, &seeds()),
        Err(TrackError::FrameUnavailable(2))
    );
}

#[test]
fn tracking_by_timestamp_matches_index() {
    let source = drifting_frames(5);
    let start = source.index_at_time(0.04).expect("frame at 40 ms");
    assert_eq!(start, 1);
    let trajectories = tracker(TrackerParams::default())
        .track(&source, start, 2, &[PixelPoint::new(32, 31)])
        .expect("track");
    assert_eq!(
        trajectories[0].positions,
        vec![Some(PixelPoint::new(32, 31)), Some(PixelPoint::new(34, 32))]
    );
}
