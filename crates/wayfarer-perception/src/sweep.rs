//! [`ScanSweep`] – one pass of the range sensor across its angular range.

use tracing::{debug, info};
use wayfarer_hal::RangeScanner;
use wayfarer_types::{NavError, ScanConfig, ScanSample, SweepDirection};

/// Sweeps a [`RangeScanner`] across the configured angles.
#[derive(Debug, Clone)]
pub struct ScanSweep {
    config: ScanConfig,
}

impl ScanSweep {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Take one reading per configured angle.
    ///
    /// The servo offset is added to every commanded angle but the returned
    /// samples carry the nominal angle.  Samples are always ordered from
    /// `max_angle` down to `min_angle`, whichever way the servo travelled.
    /// The sensor is re-centred afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the first scanner fault.
    pub fn run(&self, scanner: &mut dyn RangeScanner) -> Result<Vec<ScanSample>, NavError> {
        let mut angles = self.config.angles();
        if self.config.direction == SweepDirection::RightToLeft {
            angles.reverse();
        }

        let mut samples = Vec::with_capacity(angles.len());
        for angle in angles {
            let distance = scanner.sample(angle + self.config.servo_offset)?;
            samples.push(ScanSample::new(angle, distance));
        }
        scanner.sample(self.config.servo_offset)?;

        if self.config.direction == SweepDirection::RightToLeft {
            samples.reverse();
        }

        let dropouts = samples.iter().filter(|s| s.is_dropout()).count();
        debug!(?samples, "raw scan");
        info!(scanner = scanner.id(), samples = samples.len(), dropouts, "scan sweep complete");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_hal::sim::SimRangeScanner;

    fn small_config(direction: SweepDirection) -> ScanConfig {
        ScanConfig {
            min_angle: -10,
            max_angle: 10,
            step_angle: 10,
            servo_offset: -5,
            direction,
        }
    }

    #[test]
    fn sweep_applies_servo_offset_and_recentres() {
        let mut scanner = SimRangeScanner::new().with_reading(5, 40).with_reading(-5, 30);
        let samples = ScanSweep::new(small_config(SweepDirection::LeftToRight))
            .run(&mut scanner)
            .unwrap();

        assert_eq!(scanner.requested_angles(), &[5, -5, -15, -5]);
        assert_eq!(
            samples,
            vec![
                ScanSample::new(10, 40),
                ScanSample::new(0, 30),
                ScanSample::new(-10, -1),
            ]
        );
    }

    #[test]
    fn reverse_sweep_reports_same_order() {
        let mut forward_scanner = SimRangeScanner::new().with_reading(5, 40).with_reading(-15, 12);
        let mut reverse_scanner = SimRangeScanner::new().with_reading(5, 40).with_reading(-15, 12);

        let forward = ScanSweep::new(small_config(SweepDirection::LeftToRight))
            .run(&mut forward_scanner)
            .unwrap();
        let reverse = ScanSweep::new(small_config(SweepDirection::RightToLeft))
            .run(&mut reverse_scanner)
            .unwrap();

        assert_eq!(forward, reverse);
        assert_eq!(reverse_scanner.requested_angles(), &[-15, -5, 5, -5]);
    }

    #[test]
    fn default_sweep_takes_one_sample_per_angle() {
        let mut scanner = SimRangeScanner::new();
        let samples = ScanSweep::new(ScanConfig::default()).run(&mut scanner).unwrap();
        assert_eq!(samples.len(), 37);
        assert!(samples.iter().all(|s| s.is_dropout()));
        // 37 readings plus the re-centre.
        assert_eq!(scanner.requested_angles().len(), 38);
    }

    #[test]
    fn scanner_fault_propagates() {
        struct DeadScanner;
        impl RangeScanner for DeadScanner {
            fn id(&self) -> &str {
                "dead"
            }
            fn sample(&mut self, _angle: i32) -> Result<i32, NavError> {
                Err(NavError::HardwareFault {
                    component: "dead".to_string(),
                    details: "no echo".to_string(),
                })
            }
        }

        let result = ScanSweep::new(ScanConfig::default()).run(&mut DeadScanner);
        assert!(matches!(result, Err(NavError::HardwareFault { .. })));
    }
}
