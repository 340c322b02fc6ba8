//! [`Mission`] – one scan → map → plan → drive run with concurrent perception.
//!
//! # Tasks
//!
//! `Mission::run` starts two tasks that share nothing but a
//! [`SafetySignal`]:
//!
//! 1. **Perception** (a scoped worker thread): [`HazardMonitor::run`] over
//!    the camera and classifier, raising the hazard flag.
//! 2. **Drive** (the calling thread): sweep the range sensor, rebuild the
//!    wall set, plan with A*, then hand the path to a [`DriveController`].
//!
//! The drive task always sets the drive-complete flag on the way out, even
//! while unwinding from a panic, so the perception thread is joined on every
//! exit path.  A [`StopGuard`] around
//! the drive base issues a final `stop()` however the drive task ends.
//!
//! # Outcomes
//!
//! An unreachable goal is not an error: the report carries
//! [`MissionOutcome::NoPath`] and no motion command is issued.  Every other
//! [`NavError`] is returned to the caller.  A perception failure is logged
//! and the drive carries on without further hazard input.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use wayfarer_hal::{Camera, DriveBase, FrameClassifier, RangeScanner, Sleeper, StopGuard};
use wayfarer_kernel::{EmergencyStop, SafetySignal, verify_path};
use wayfarer_perception::{HazardMonitor, OccupancyMapper, ScanSweep, walls_from_points};
use wayfarer_planner::{GridOverlay, WeightedGrid, astar_search, reconstruct_path};
use wayfarer_types::{GridCell, MissionConfig, MissionOutcome, MissionReport, NavError};

use crate::drive::{DriveController, DriveStats};

/// The collaborators a mission drives.
pub struct MissionHardware {
    pub scanner: Box<dyn RangeScanner>,
    pub drive: Arc<dyn DriveBase>,
    pub camera: Box<dyn Camera>,
    pub classifier: Box<dyn FrameClassifier>,
    pub sleeper: Arc<dyn Sleeper>,
}

/// Result of the planning stage.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub grid: WeightedGrid,
    /// `None` when the goal is unreachable.
    pub path: Option<Vec<GridCell>>,
    /// ASCII map with the path (or the explored frontier) drawn in.
    pub map: String,
    pub expanded: usize,
}

/// A configured, validated mission ready to run once.
pub struct Mission {
    config: MissionConfig,
    hardware: MissionHardware,
    estop: EmergencyStop,
}

impl Mission {
    /// # Errors
    ///
    /// Returns [`NavError::Config`] if `config` fails validation.
    pub fn new(config: MissionConfig, hardware: MissionHardware) -> Result<Self, NavError> {
        config.validate()?;
        let estop = EmergencyStop::new(Arc::clone(&hardware.drive));
        Ok(Self {
            config,
            hardware,
            estop,
        })
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// Handle for halting the vehicle from another thread (e.g. a Ctrl-C
    /// handler).
    pub fn emergency_stop(&self) -> EmergencyStop {
        self.estop.clone()
    }

    /// Run the mission to completion.
    ///
    /// # Errors
    ///
    /// Returns any fatal [`NavError`] raised by the scanner, the drive base,
    /// or the drive controller, including
    /// [`NavError::EmergencyStopped`] after an operator interrupt.
    #[instrument(skip_all, fields(mission_id = tracing::field::Empty))]
    pub fn run(self) -> Result<MissionReport, NavError> {
        let mission_id = Uuid::new_v4();
        tracing::Span::current().record("mission_id", tracing::field::display(mission_id));
        let started_at = Utc::now();

        let Mission {
            config,
            hardware,
            estop,
        } = self;
        let MissionHardware {
            mut scanner,
            drive,
            mut camera,
            mut classifier,
            sleeper,
        } = hardware;

        let start = config.start();
        let goal = config.goal();
        info!(%start, %goal, grid = config.grid_size, "mission starting");

        let _guard = StopGuard::new(Arc::clone(&drive));
        let (observer, hazard_link, drive_link) = SafetySignal::pair();
        let monitor = HazardMonitor::new(config.perception.clone());
        let mut controller = DriveController::new(
            start,
            config.drive.clone(),
            drive,
            sleeper,
            drive_link,
        )
        .with_emergency_stop(estop);

        let (route, stats) = std::thread::scope(|scope| {
            let perception = scope.spawn(move || {
                monitor.run(camera.as_mut(), classifier.as_mut(), &hazard_link)
            });

            let outcome = {
                let mut controller = FinishOnDrop(&mut controller);
                drive_task(&config, scanner.as_mut(), &mut controller)
            };

            match perception.join() {
                Ok(Ok(stats)) => debug!(
                    frames = stats.frames,
                    episodes = stats.episodes,
                    "perception task joined"
                ),
                Ok(Err(e)) => warn!(error = %e, "perception task ended early"),
                Err(_) => error!("perception task panicked"),
            }
            outcome
        })?;

        let outcome = if route.path.is_some() {
            MissionOutcome::Completed
        } else {
            MissionOutcome::NoPath
        };
        info!(
            ?outcome,
            location = %controller.location(),
            hazard_episodes = observer.hazard_episode(),
            "mission finished"
        );

        Ok(MissionReport {
            mission_id,
            started_at,
            finished_at: Utc::now(),
            outcome,
            start,
            goal,
            walls: route.grid.walls().len(),
            path: route.path.unwrap_or_default(),
            moves: stats.moves,
            turns: stats.turns,
            hazard_pauses: stats.hazard_pauses,
            map: route.map.lines().map(str::to_string).collect(),
        })
    }
}

/// Marks the drive complete when dropped.
struct FinishOnDrop<'a>(&'a mut DriveController);

impl Deref for FinishOnDrop<'_> {
    type Target = DriveController;

    fn deref(&self) -> &DriveController {
        self.0
    }
}

impl DerefMut for FinishOnDrop<'_> {
    fn deref_mut(&mut self) -> &mut DriveController {
        self.0
    }
}

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Everything the drive task does between spawning perception and joining
/// it.
fn drive_task(
    config: &MissionConfig,
    scanner: &mut dyn RangeScanner,
    controller: &mut DriveController,
) -> Result<(RoutePlan, DriveStats), NavError> {
    let grid = survey(config, scanner)?;
    let route = plan_route(&grid, config.start(), config.goal())?;
    let stats = match &route.path {
        Some(path) => controller.run(path)?,
        None => DriveStats::default(),
    };
    Ok((route, stats))
}

/// Sweep the range sensor once and build the occupancy grid from it.
///
/// # Errors
///
/// Propagates scanner faults.
pub fn survey(config: &MissionConfig, scanner: &mut dyn RangeScanner) -> Result<WeightedGrid, NavError> {
    let samples = ScanSweep::new(config.scan.clone()).run(scanner)?;
    let points = OccupancyMapper::new(config.mapping_radius).map(&samples);
    let walls = walls_from_points(&points, config.cell_size);
    info!(points = points.len(), walls = walls.len(), "wall set rebuilt");
    Ok(WeightedGrid::new(config.grid_size, config.grid_size).with_walls(walls))
}

/// Plan a route across `grid` and render it.
///
/// An unreachable goal yields a plan with `path: None`.
///
/// # Errors
///
/// Propagates reconstruction errors other than [`NavError::Unreachable`],
/// and [`NavError::InvalidStep`] if the route is not a chain of unit steps.
pub fn plan_route(grid: &WeightedGrid, start: GridCell, goal: GridCell) -> Result<RoutePlan, NavError> {
    let search = astar_search(grid, start, goal);
    let path = if search.reached {
        match reconstruct_path(&search.came_from, start, goal) {
            Ok(path) => {
                verify_path(&path)?;
                Some(path)
            }
            Err(NavError::Unreachable { .. }) => None,
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    let overlay = GridOverlay {
        start: Some(start),
        goal: Some(goal),
        path: path.as_deref(),
        came_from: path.is_none().then_some(&search.came_from),
    };
    let map = grid.render(&overlay);

    match &path {
        Some(p) => {
            let route: Vec<String> = p.iter().map(ToString::to_string).collect();
            info!(
                steps = p.len() - 1,
                expanded = search.expanded,
                cost = search.goal_cost(goal),
                "route planned: {}",
                route.join(" -> ")
            );
        }
        None => warn!(%start, %goal, expanded = search.expanded, "no path to goal"),
    }
    debug!("planned map:\n{map}");

    Ok(RoutePlan {
        grid: grid.clone(),
        path,
        map,
        expanded: search.expanded,
    })
}
