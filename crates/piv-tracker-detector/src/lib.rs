//! Pattern matching between two frames for PIV-style point tracking.
//!
//! Pipeline per point:
//! - crop the pattern window around the point in frame A and a search window
//!   (pattern plus search range) around the same point in frame B;
//! - score every alignment with zero-mean normalized cross-correlation;
//! - reject weak or border peaks, refine the rest with a three-point
//!   Gaussian fit;
//! - map the refined peak back to a displacement and a point in frame B.
//!
//! Every rejection is a routine outcome. [`PatternDetector::detect`] returns
//! `None` for all of them, [`PatternDetector::match_point`] keeps the reason.
//!
//! ```
//! use piv_tracker_core::{GrayImage, PixelPoint};
//! use piv_tracker_detector::{DetectorParams, PatternDetector};
//!
//! let frame = GrayImage::from_fn(64, 64, |r, c| {
//!     let (y, x) = (r as f32, c as f32);
//!     100.0 + 50.0 * (0.37 * y).sin() + 40.0 * (0.23 * x + 0.11 * y).cos()
//! });
//! let detector = PatternDetector::new(DetectorParams::default()).expect("valid params");
//! let p = PixelPoint::new(32, 32);
//! assert_eq!(detector.detect(&frame.view(), &frame.view(), p), Some(p));
//! ```

mod correlation;
mod detector;
mod error;
mod frames;
mod params;
mod peak;
mod tracker;
mod types;
mod window;

pub use correlation::{
    zncc_surface, zncc_with_template, CorrelationSurface, NormalizedTemplate,
    FLAT_ENERGY_PER_SAMPLE,
};
pub use detector::PatternDetector;
pub use error::{ConfigError, MatchError};
pub use frames::{FrameSource, FramesError, InMemoryFrames};
pub use params::{DetectorParams, PatternSize, SearchRange};
pub use peak::{gaussian_offset, locate_peak, refine_peak, Peak, RefinedPeak};
pub use tracker::{LostPolicy, TrackError, Tracker, TrackerParams, Trajectory};
pub use types::{Displacement, PatternMatch};
pub use window::{extract_window, WindowExtent, WindowRect};
