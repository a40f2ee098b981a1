//! High-level facade crate for the `piv-tracker-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core image types and the pattern detector;
//! - (feature `image`) conversion from `image` crate buffers and an
//!   image-file frame sequence for the tracker;
//! - (feature `cli`) the `piv-tracker` command line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use piv_tracker::io::load_gray;
//! use piv_tracker::{DetectorParams, PatternDetector, PixelPoint};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = load_gray("frame_000.png")?;
//! let b = load_gray("frame_001.png")?;
//! let detector = PatternDetector::new(DetectorParams::default())?;
//!
//! match detector.detect(&a.view(), &b.view(), PixelPoint::new(120, 80)) {
//!     Some(p) => println!("moved to ({}, {})", p.x, p.y),
//!     None => println!("lost"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `piv_tracker::core`: images, pixel points, logger.
//! - `piv_tracker::detector`: windows, ZNCC surface, peak refinement,
//!   detector, tracker.
//! - `piv_tracker::io` (feature `image`): image loading and `ImageSequence`.

pub use piv_tracker_core as core;
pub use piv_tracker_detector as detector;

pub use piv_tracker_core::{GrayImage, GrayImageView, PixelPoint};
pub use piv_tracker_detector::{
    DetectorParams, Displacement, FrameSource, LostPolicy, MatchError, PatternDetector,
    PatternMatch, PatternSize, SearchRange, Tracker, TrackerParams, Trajectory,
};

#[cfg(feature = "image")]
pub mod io;
