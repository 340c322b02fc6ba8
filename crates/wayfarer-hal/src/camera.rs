//! Generic `Camera` and `FrameClassifier` traits for the perception side.

use wayfarer_types::{Detection, NavError};

/// A raw image frame returned by a camera driver.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data (e.g. RGB24 or greyscale).
    pub data: Vec<u8>,
}

/// A camera or image-capture device.
pub trait Camera: Send {
    /// Stable identifier for this camera, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.  May block until the
    /// device delivers one.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if the frame cannot be captured
    /// (e.g. the device is disconnected or the buffer is unavailable).
    fn capture(&mut self) -> Result<CameraFrame, NavError>;
}

/// On-device object detector.
///
/// The navigation core only inspects the label of each [`Detection`]; model
/// loading, pre-processing, and score thresholds belong to the implementor.
pub trait FrameClassifier: Send {
    /// Classify `frame`, returning zero or more detections.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if inference fails.
    fn classify(&mut self, frame: &CameraFrame) -> Result<Vec<Detection>, NavError>;
}
