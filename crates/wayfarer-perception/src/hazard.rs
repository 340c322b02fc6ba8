//! [`HazardMonitor`] – the perception task.
//!
//! Captures frames until the drive task reports completion, classifies every
//! `frame_stride`-th frame, and raises the hazard flag when the configured
//! label appears.  The flag is raised once per detection episode: an episode
//! starts on the first classified frame containing the label and ends on the
//! first classified frame without it.
//!
//! Nothing but the two [`SafetySignal`][wayfarer_kernel::SafetySignal]
//! flags leaves this task.  Frames and detections stay here.

use std::time::Instant;

use tracing::{debug, info, warn};
use wayfarer_hal::{Camera, FrameClassifier};
use wayfarer_kernel::HazardLink;
use wayfarer_types::{NavError, PerceptionConfig};

/// Counters describing one perception run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Frames captured.
    pub frames: u64,
    /// Frames passed to the classifier.
    pub classified: u64,
    /// Hazard episodes raised.
    pub episodes: u64,
}

/// Frame-rate tracker averaged over a fixed window of frames.
struct FpsWindow {
    window: u32,
    count: u32,
    started: Instant,
    fps: f64,
}

impl FpsWindow {
    fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            count: 0,
            started: Instant::now(),
            fps: 0.0,
        }
    }

    /// Record a frame; returns the new average when a window closes.
    fn tick(&mut self) -> Option<f64> {
        self.count += 1;
        if self.count < self.window {
            return None;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.fps = f64::from(self.window) / elapsed;
        }
        self.count = 0;
        self.started = Instant::now();
        Some(self.fps)
    }
}

/// Watches the camera for the hazard label.
#[derive(Debug, Clone)]
pub struct HazardMonitor {
    config: PerceptionConfig,
}

impl HazardMonitor {
    pub fn new(config: PerceptionConfig) -> Self {
        Self { config }
    }

    fn is_hazard(&self, labels: impl IntoIterator<Item = impl AsRef<str>>) -> bool {
        labels
            .into_iter()
            .any(|l| l.as_ref() == self.config.hazard_label)
    }

    /// Run until `link` reports the drive complete.
    ///
    /// # Errors
    ///
    /// Returns the first camera or classifier fault.  The hazard flag is left
    /// as it was; the drive task carries on without further hazard input.
    pub fn run(
        &self,
        camera: &mut dyn Camera,
        classifier: &mut dyn FrameClassifier,
        link: &HazardLink,
    ) -> Result<MonitorStats, NavError> {
        let stride = u64::from(self.config.frame_stride.max(1));
        let mut stats = MonitorStats::default();
        let mut fps = FpsWindow::new(self.config.fps_window);
        let mut in_episode = false;

        info!(camera = camera.id(), label = %self.config.hazard_label, "perception task started");

        while !link.drive_complete() {
            let frame = camera.capture().inspect_err(|e| {
                warn!(error = %e, "camera capture failed; perception task ending");
            })?;
            stats.frames += 1;

            if stats.frames % stride == 0 {
                let detections = classifier.classify(&frame)?;
                stats.classified += 1;

                if self.is_hazard(detections.iter().map(|d| d.label.as_str())) {
                    if !in_episode {
                        info!(frame = stats.frames, "hazard detected: {}", self.config.hazard_label);
                        link.raise_hazard();
                        stats.episodes += 1;
                        in_episode = true;
                    }
                } else {
                    in_episode = false;
                }

                if let Some(rate) = fps.tick() {
                    debug!(fps = %format!("{rate:.1}"), "perception frame rate");
                }
            }
        }

        info!(
            frames = stats.frames,
            classified = stats.classified,
            episodes = stats.episodes,
            "drive complete; perception task stopping"
        );
        Ok(stats)
    }
}
