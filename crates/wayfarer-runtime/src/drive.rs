//! [`DriveController`] – executes a planned path one axis-aligned segment at
//! a time.
//!
//! The controller owns the vehicle pose and the drive side of the
//! [`SafetySignal`][wayfarer_kernel::SafetySignal].  Before every segment it
//! checks the hazard flag; a hazard episode it has not yet honoured costs one
//! blocking cooldown.  The flag itself is never cleared here.  The emergency
//! stop is checked before every segment and again after every wait.
//!
//! Every motion primitive is "command, wait, stop": the wait goes through the
//! injected [`Sleeper`] so simulations never spend wall-clock time.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use wayfarer_hal::{DriveBase, Sleeper};
use wayfarer_kernel::{DriveLink, EmergencyStop, Turn, step_between, turn_between};
use wayfarer_types::{DriveConfig, GridCell, Heading, NavError, VehiclePose};

/// Counters accumulated while following a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveStats {
    /// Forward commands issued.
    pub moves: usize,
    /// Quarter turns issued.
    pub turns: usize,
    /// Hazard cooldowns observed.
    pub hazard_pauses: usize,
}

/// Grid-level motion state machine.
pub struct DriveController {
    pose: VehiclePose,
    config: DriveConfig,
    base: Arc<dyn DriveBase>,
    sleeper: Arc<dyn Sleeper>,
    link: DriveLink,
    estop: Option<EmergencyStop>,
    /// Last hazard episode a cooldown was spent on.
    honoured_episode: u64,
    stats: DriveStats,
}

impl DriveController {
    /// Place the vehicle at `start`, facing `config.initial_heading`.
    pub fn new(
        start: GridCell,
        config: DriveConfig,
        base: Arc<dyn DriveBase>,
        sleeper: Arc<dyn Sleeper>,
        link: DriveLink,
    ) -> Self {
        Self {
            pose: VehiclePose {
                location: start,
                heading: config.initial_heading,
            },
            config,
            base,
            sleeper,
            link,
            estop: None,
            honoured_episode: 0,
            stats: DriveStats::default(),
        }
    }

    /// Abort before the next motion command once `estop` has been triggered.
    pub fn with_emergency_stop(mut self, estop: EmergencyStop) -> Self {
        self.estop = Some(estop);
        self
    }

    pub fn pose(&self) -> VehiclePose {
        self.pose
    }

    pub fn location(&self) -> GridCell {
        self.pose.location
    }

    pub fn heading(&self) -> Heading {
        self.pose.heading
    }

    pub fn stats(&self) -> DriveStats {
        self.stats
    }

    // ── Segment execution ──────────────────────────────────────────────────

    /// Drive one axis-aligned segment to `dest`.
    ///
    /// # Errors
    ///
    /// - [`NavError::InvalidStep`] if `dest` is not a non-zero move along
    ///   exactly one axis.
    /// - [`NavError::EmergencyStopped`] if the operator halted the vehicle
    ///   before or during the segment.  An interrupted segment leaves the
    ///   pose at its last confirmed value.
    /// - [`NavError::UnsupportedTurn`] if the segment needs a reversal.
    /// - [`NavError::HardwareFault`] if the drive base rejects a command.
    /// - [`NavError::ActuationMismatch`] if the computed arrival differs from
    ///   `dest`.
    pub fn move_to(&mut self, dest: GridCell) -> Result<(), NavError> {
        let step = step_between(self.pose.location, dest)?;
        self.ensure_running()?;

        if self.honour_hazard() {
            self.ensure_running()?;
        }

        self.face(step.heading)?;

        self.base.forward(self.config.forward_speed)?;
        self.sleeper.sleep(self.config.forward_time(step.distance));
        self.base.stop();
        self.ensure_running()?;
        self.stats.moves += 1;

        let arrived = self.pose.location.advanced(self.pose.heading, step.distance);
        self.settle(dest, arrived)?;
        info!(
            location = %self.pose.location,
            heading = %self.pose.heading,
            distance = step.distance,
            "segment complete"
        );
        Ok(())
    }

    /// Follow `path` from its first cell, which must be the current
    /// location, to its last.
    ///
    /// The drive-complete flag is set when this returns, whether the path
    /// was finished or abandoned, so the perception task always winds down.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`move_to`][Self::move_to], or
    /// [`NavError::InvalidStep`] if the path does not start where the
    /// vehicle is.
    pub fn run(&mut self, path: &[GridCell]) -> Result<DriveStats, NavError> {
        let result = self.follow(path);
        self.finish();
        match &result {
            Ok(stats) => info!(
                location = %self.pose.location,
                moves = stats.moves,
                turns = stats.turns,
                hazard_pauses = stats.hazard_pauses,
                "path complete"
            ),
            Err(e) => error!(location = %self.pose.location, error = %e, "drive aborted"),
        }
        result
    }

    /// Mark the drive task finished without moving.  Idempotent.
    pub fn finish(&self) {
        self.link.mark_drive_complete();
    }

    fn follow(&mut self, path: &[GridCell]) -> Result<DriveStats, NavError> {
        let Some((&first, rest)) = path.split_first() else {
            return Ok(self.stats);
        };
        if first != self.pose.location {
            return Err(NavError::InvalidStep {
                from: self.pose.location,
                to: first,
            });
        }
        for &cell in rest {
            self.move_to(cell)?;
        }
        Ok(self.stats)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Checked before a segment and after every wait, so no motion command
    /// follows a triggered emergency stop.
    fn ensure_running(&self) -> Result<(), NavError> {
        match &self.estop {
            Some(estop) if estop.is_triggered() => Err(NavError::EmergencyStopped),
            _ => Ok(()),
        }
    }

    /// Spend one cooldown on a hazard episode not yet honoured.
    fn honour_hazard(&mut self) -> bool {
        let episode = self.link.hazard_episode();
        if episode <= self.honoured_episode {
            return false;
        }
        warn!(
            episode,
            location = %self.pose.location,
            cooldown_ms = self.config.hazard_cooldown_ms,
            "hazard observed; holding position"
        );
        self.base.stop();
        self.sleeper.sleep(self.config.hazard_cooldown());
        self.honoured_episode = episode;
        self.stats.hazard_pauses += 1;
        true
    }

    fn face(&mut self, required: Heading) -> Result<(), NavError> {
        let Some(turn) = turn_between(self.pose.heading, required)? else {
            return Ok(());
        };
        let speed = self.config.turn_speed;
        match turn {
            Turn::Left => self.base.turn_left(speed)?,
            Turn::Right => self.base.turn_right(speed)?,
        }
        self.sleeper.sleep(self.config.turn_time());
        self.base.stop();
        self.ensure_running()?;
        debug!(from = %self.pose.heading, to = %required, ?turn, "turned");
        self.pose.heading = required;
        self.stats.turns += 1;
        Ok(())
    }

    fn settle(&mut self, expected: GridCell, actual: GridCell) -> Result<(), NavError> {
        if actual != expected {
            return Err(NavError::ActuationMismatch { expected, actual });
        }
        self.pose.location = actual;
        Ok(())
    }
}

impl std::fmt::Debug for DriveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveController")
            .field("pose", &self.pose)
            .field("drive", &self.base.id())
            .field("honoured_episode", &self.honoured_episode)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use wayfarer_hal::sim::{DriveCommand, RecordingSleeper, SimDriveBase};
    use wayfarer_kernel::{HazardLink, SafetySignal};

    fn cells(raw: &[(i32, i32)]) -> Vec<GridCell> {
        raw.iter().copied().map(GridCell::from).collect()
    }

    struct Rig {
        base: Arc<SimDriveBase>,
        sleeper: Arc<RecordingSleeper>,
        observer: SafetySignal,
        hazard: HazardLink,
        controller: DriveController,
    }

    fn rig(start: (i32, i32)) -> Rig {
        let base = Arc::new(SimDriveBase::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let (observer, hazard, drive) = SafetySignal::pair();
        let controller = DriveController::new(
            start.into(),
            DriveConfig::default(),
            base.clone(),
            sleeper.clone(),
            drive,
        );
        Rig {
            base,
            sleeper,
            observer,
            hazard,
            controller,
        }
    }

    /// Drive base that raises a hazard on a chosen forward command.
    struct TrippingBase {
        inner: SimDriveBase,
        hazard: HazardLink,
        trip_on: usize,
    }

    impl DriveBase for TrippingBase {
        fn id(&self) -> &str {
            "tripping_drive"
        }
        fn forward(&self, speed: u8) -> Result<(), NavError> {
            self.inner.forward(speed)?;
            if self.inner.forward_count() == self.trip_on {
                self.hazard.raise_hazard();
            }
            Ok(())
        }
        fn turn_left(&self, speed: u8) -> Result<(), NavError> {
            self.inner.turn_left(speed)
        }
        fn turn_right(&self, speed: u8) -> Result<(), NavError> {
            self.inner.turn_right(speed)
        }
        fn stop(&self) {
            self.inner.stop();
        }
    }

    #[test]
    fn five_by_five_mission_uses_six_moves_and_two_turns() {
        let mut rig = rig((2, 0));
        let path = cells(&[(2, 0), (3, 0), (4, 0), (4, 1), (4, 2), (4, 3), (4, 4)]);

        let stats = rig.controller.run(&path).unwrap();

        assert_eq!(stats.moves, 6);
        assert!(stats.turns <= 2);
        assert_eq!(rig.base.forward_count(), 6);
        assert_eq!(rig.base.turn_count(), stats.turns);
        assert_eq!(rig.controller.location(), GridCell::new(4, 4));
        assert_eq!(rig.controller.heading(), Heading::South);
        assert!(rig.observer.drive_complete());
    }

    #[test]
    fn turns_follow_the_clockwise_cycle() {
        let mut rig = rig((2, 0));
        // South → East is counter-clockwise, East → South is clockwise.
        rig.controller.move_to(GridCell::new(3, 0)).unwrap();
        rig.controller.move_to(GridCell::new(3, 1)).unwrap();

        let commands = rig.base.commands();
        assert_eq!(commands[0], DriveCommand::TurnLeft { speed: 30 });
        assert!(commands.contains(&DriveCommand::TurnRight { speed: 30 }));
        assert_eq!(rig.controller.heading(), Heading::South);
    }

    #[test]
    fn every_primitive_ends_in_a_stop() {
        let mut rig = rig((0, 0));
        rig.controller.move_to(GridCell::new(1, 0)).unwrap();

        let commands = rig.base.commands();
        assert_eq!(
            commands,
            vec![
                DriveCommand::TurnLeft { speed: 30 },
                DriveCommand::Stop,
                DriveCommand::Forward { speed: 8 },
                DriveCommand::Stop,
            ]
        );
        assert_eq!(
            rig.sleeper.waits(),
            vec![Duration::from_millis(1000), Duration::from_millis(400)]
        );
    }

    #[test]
    fn forward_time_scales_with_distance() {
        let mut rig = rig((1, 0));
        rig.controller.move_to(GridCell::new(1, 3)).unwrap();
        assert_eq!(rig.sleeper.waits(), vec![Duration::from_millis(1200)]);
        assert_eq!(rig.controller.location(), GridCell::new(1, 3));
        assert_eq!(rig.base.turn_count(), 0);
    }

    #[test]
    fn hazard_before_a_segment_costs_one_cooldown() {
        let mut rig = rig((0, 0));
        rig.hazard.raise_hazard();

        rig.controller
            .run(&cells(&[(0, 0), (0, 1), (0, 2), (0, 3)]))
            .unwrap();

        let cooldown = Duration::from_millis(3000);
        assert_eq!(rig.sleeper.count_of(cooldown), 1);
        assert_eq!(rig.controller.stats().hazard_pauses, 1);
        // The flag is still up.
        assert!(rig.observer.hazard_detected());
    }

    #[test]
    fn hazard_mid_mission_is_honoured_once_at_next_boundary() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let (observer, hazard, drive) = SafetySignal::pair();
        let base = Arc::new(TrippingBase {
            inner: SimDriveBase::new(),
            hazard,
            trip_on: 2,
        });
        let mut controller = DriveController::new(
            GridCell::new(2, 0),
            DriveConfig::default(),
            base.clone(),
            sleeper.clone(),
            drive,
        );

        let path = cells(&[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        let stats = controller.run(&path).unwrap();

        assert_eq!(stats.hazard_pauses, 1);
        assert_eq!(stats.moves, 4);
        assert_eq!(sleeper.count_of(Duration::from_millis(3000)), 1);
        assert_eq!(observer.hazard_episode(), 1);

        // The cooldown sits between the second and third forward commands.
        let waits = sleeper.waits();
        let pause_at = waits
            .iter()
            .position(|&d| d == Duration::from_millis(3000))
            .unwrap();
        assert_eq!(pause_at, 2);
    }

    #[test]
    fn second_episode_earns_a_second_cooldown() {
        let mut rig = rig((0, 0));
        rig.hazard.raise_hazard();
        rig.controller.move_to(GridCell::new(0, 1)).unwrap();
        rig.controller.move_to(GridCell::new(0, 2)).unwrap();
        rig.hazard.raise_hazard();
        rig.controller.move_to(GridCell::new(0, 3)).unwrap();

        assert_eq!(rig.controller.stats().hazard_pauses, 2);
    }

    #[test]
    fn reversal_is_rejected_without_moving() {
        let mut rig = rig((2, 2));
        let result = rig.controller.move_to(GridCell::new(2, 1));
        assert!(matches!(
            result,
            Err(NavError::UnsupportedTurn {
                from: Heading::South,
                to: Heading::North
            })
        ));
        assert_eq!(rig.base.forward_count(), 0);
        assert_eq!(rig.controller.location(), GridCell::new(2, 2));
    }

    #[test]
    fn zero_length_and_diagonal_steps_are_invalid() {
        let mut rig = rig((2, 2));
        assert!(matches!(
            rig.controller.move_to(GridCell::new(2, 2)),
            Err(NavError::InvalidStep { .. })
        ));
        assert!(matches!(
            rig.controller.move_to(GridCell::new(3, 3)),
            Err(NavError::InvalidStep { .. })
        ));
        assert!(rig.base.commands().is_empty());
    }

    #[test]
    fn path_must_start_at_current_location() {
        let mut rig = rig((0, 0));
        let result = rig.controller.run(&cells(&[(1, 0), (2, 0)]));
        assert!(matches!(result, Err(NavError::InvalidStep { .. })));
        // Completion is still signalled so perception can stop.
        assert!(rig.observer.drive_complete());
    }

    #[test]
    fn empty_and_single_cell_paths_do_nothing() {
        let mut rig = rig((3, 3));
        assert_eq!(rig.controller.run(&[]).unwrap(), DriveStats::default());
        assert_eq!(
            rig.controller.run(&cells(&[(3, 3)])).unwrap(),
            DriveStats::default()
        );
        assert!(rig.base.commands().is_empty());
    }

    #[test]
    fn emergency_stop_aborts_at_segment_boundary() {
        let base = Arc::new(SimDriveBase::new());
        let estop = EmergencyStop::new(base.clone());
        let (observer, _hazard, drive) = SafetySignal::pair();
        let mut controller = DriveController::new(
            GridCell::new(0, 0),
            DriveConfig::instantaneous(),
            base.clone(),
            Arc::new(RecordingSleeper::new()),
            drive,
        )
        .with_emergency_stop(estop.clone());

        controller.move_to(GridCell::new(0, 1)).unwrap();
        estop.trigger();
        let result = controller.run(&cells(&[(0, 1), (0, 2)]));

        assert!(matches!(result, Err(NavError::EmergencyStopped)));
        assert_eq!(controller.location(), GridCell::new(0, 1));
        assert_eq!(base.forward_count(), 1);
        assert!(observer.drive_complete());
    }

    /// Sleeper that triggers the emergency stop during its `n`-th wait.
    struct InterruptingSleeper {
        estop: EmergencyStop,
        trigger_on: u32,
        calls: AtomicU32,
    }

    impl Sleeper for InterruptingSleeper {
        fn sleep(&self, _duration: Duration) {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.trigger_on {
                self.estop.trigger();
            }
        }
    }

    fn interrupted_controller(trigger_on: u32) -> (Arc<SimDriveBase>, DriveController) {
        let base = Arc::new(SimDriveBase::new());
        let estop = EmergencyStop::new(base.clone());
        let sleeper = Arc::new(InterruptingSleeper {
            estop: estop.clone(),
            trigger_on,
            calls: AtomicU32::new(0),
        });
        let (_observer, _hazard, drive) = SafetySignal::pair();
        let controller = DriveController::new(
            GridCell::new(2, 0),
            DriveConfig::default(),
            base.clone(),
            sleeper,
            drive,
        )
        .with_emergency_stop(estop);
        (base, controller)
    }

    #[test]
    fn emergency_stop_during_turn_blocks_forward() {
        // First wait is the left turn towards East.
        let (base, mut controller) = interrupted_controller(1);

        let result = controller.run(&cells(&[(2, 0), (3, 0)]));

        assert!(matches!(result, Err(NavError::EmergencyStopped)));
        assert_eq!(base.forward_count(), 0);
        assert_eq!(controller.location(), GridCell::new(2, 0));
        assert_eq!(controller.heading(), Heading::South);
        assert_eq!(controller.stats(), DriveStats::default());
    }

    #[test]
    fn emergency_stop_during_last_segment_is_not_completion() {
        // Waits: turn, forward.  The stop lands while driving the only segment.
        let (base, mut controller) = interrupted_controller(2);

        let result = controller.run(&cells(&[(2, 0), (3, 0)]));

        assert!(matches!(result, Err(NavError::EmergencyStopped)));
        assert_eq!(base.forward_count(), 1);
        assert_eq!(base.commands().last(), Some(&DriveCommand::Stop));
        assert_eq!(controller.location(), GridCell::new(2, 0));
        assert_eq!(controller.stats().moves, 0);
    }

    #[test]
    fn jammed_base_surfaces_hardware_fault() {
        let mut rig = rig((0, 0));
        rig.base.jam();
        let result = rig.controller.move_to(GridCell::new(0, 1));
        assert!(matches!(result, Err(NavError::HardwareFault { .. })));
        assert_eq!(rig.controller.location(), GridCell::new(0, 0));
    }

    #[test]
    fn arrival_mismatch_is_fatal_and_keeps_pose() {
        let mut rig = rig((2, 2));
        let result = rig.controller.settle(GridCell::new(2, 3), GridCell::new(2, 4));
        assert!(matches!(
            result,
            Err(NavError::ActuationMismatch { expected, actual })
                if expected == GridCell::new(2, 3) && actual == GridCell::new(2, 4)
        ));
        assert_eq!(rig.controller.location(), GridCell::new(2, 2));
    }
}
