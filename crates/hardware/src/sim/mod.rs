//! Software models of the firmware peak finders and the frame driver that
//! clocks captured orbits through them.

/// Frame driver pairing a peak source with an extractor.
pub mod driver;
/// Threshold and derivative peak finder models.
pub mod models;

pub use driver::FrameDriver;
pub use models::{DerivativeDetector, PeakSource, ThresholdDetector};
