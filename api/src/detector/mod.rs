//! Crash-file detection pipeline
//!
//! A probe runs three stages in order:
//! - [`size_gate`] rejects resources whose declared length is over the limit
//! - [`stream`] runs ffprobe and yields one [`sample::FrameSample`] per frame
//! - [`checker`] compares each frame to the first and stops at the first change
//!
//! [`probe::Detector`] ties them together and owns analyzer cleanup.

pub mod checker;
pub mod error;
pub mod locator;
pub mod probe;
pub mod sample;
pub mod size_gate;
pub mod stream;

pub use error::DetectError;
pub use locator::ResourceLocator;
pub use probe::{AnalysisSettings, Detector};
pub use size_gate::SizeGate;
