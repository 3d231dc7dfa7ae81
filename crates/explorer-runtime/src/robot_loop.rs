//! [`RobotLoop`] – the robot-mode control loop.
//!
//! Each [`RobotLoop::step`]:
//!
//! 1. **Observe** – read the pose, then (if a frame is available) detect
//!    objects and associate each one using the pose as the camera pose.
//! 2. **Decide** – tick the [`NavigationController`].
//! 3. **Act** – hand the command to the [`MotorSink`].  A hardware fault is
//!    logged and counted; the loop keeps going.
//!
//! Steps never overlap.  Updating the destination happens between steps via
//! [`RobotLoop::navigation_mut`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use explorer_hal::{FrameSource, MotorSink, PoseSource};
use explorer_perception::{Catalog, CameraPose, DetectionMapper, Detector, ImageSize, associate_frame};
use explorer_types::{FrameObservation, MotorCommand, Pose};
use tracing::{debug, info, warn};

use crate::navigation::{NavState, NavigationController};

/// The robot-side devices a [`RobotLoop`] drives.
pub struct RobotHardware {
    pub frames: Box<dyn FrameSource>,
    pub pose: Box<dyn PoseSource>,
    pub motors: Box<dyn MotorSink>,
}

/// What happened during one [`RobotLoop::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick counter.
    pub tick: u64,
    pub pose: Pose,
    /// `None` when no frame was available this tick.
    pub observation: Option<FrameObservation>,
    pub command: MotorCommand,
    /// Controller state after the tick.
    pub state: NavState,
    /// Whether the motor sink accepted the command.
    pub command_applied: bool,
}

/// Totals for one [`RobotLoop::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub motor_faults: u64,
}

pub struct RobotLoop {
    hardware: RobotHardware,
    detector: Box<dyn Detector>,
    catalog: Catalog,
    mapper: DetectionMapper,
    navigation: NavigationController,
    latest: Option<FrameObservation>,
    ticks: u64,
    motor_faults: u64,
}

impl RobotLoop {
    pub fn new(
        hardware: RobotHardware,
        detector: Box<dyn Detector>,
        catalog: Catalog,
        mapper: DetectionMapper,
        navigation: NavigationController,
    ) -> Self {
        Self {
            hardware,
            detector,
            catalog,
            mapper,
            navigation,
            latest: None,
            ticks: 0,
            motor_faults: 0,
        }
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Access to `set_destination` / `clear_destination` between steps.
    pub fn navigation_mut(&mut self) -> &mut NavigationController {
        &mut self.navigation
    }

    /// Most recent frame observation.
    pub fn latest_observation(&self) -> Option<&FrameObservation> {
        self.latest.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn step(&mut self) -> TickReport {
        self.ticks += 1;

        // ── 1. Observe ───────────────────────────────────────────────────────
        let pose = self.hardware.pose.get_pose();
        let observation = self.hardware.frames.get_frame().map(|frame| {
            let detections = self.detector.detect(&frame);
            associate_frame(
                &detections,
                &CameraPose::from(pose),
                &self.catalog,
                ImageSize::new(frame.width, frame.height),
                &self.mapper,
            )
        });
        if let Some(obs) = &observation {
            debug!(tick = self.ticks, objects = obs.objects.len(), "frame observed");
            self.latest = Some(obs.clone());
        }

        // ── 2. Decide ────────────────────────────────────────────────────────
        let command = self.navigation.tick(&pose);

        // ── 3. Act ───────────────────────────────────────────────────────────
        let command_applied = match self.hardware.motors.send_command(command) {
            Ok(()) => true,
            Err(e) => {
                self.motor_faults += 1;
                warn!(tick = self.ticks, error = %e, "motor command not applied");
                false
            }
        };

        TickReport {
            tick: self.ticks,
            pose,
            observation,
            command,
            state: self.navigation.state(),
            command_applied,
        }
    }

    /// Step until `shutdown` is set or `max_ticks` steps have run, pacing
    /// steps `tick_period` apart, then send a final stop.
    pub fn run(&mut self, shutdown: &AtomicBool, tick_period: Duration, max_ticks: Option<u64>) -> RunSummary {
        let start_ticks = self.ticks;
        let start_faults = self.motor_faults;
        info!(period_ms = tick_period.as_millis() as u64, ?max_ticks, "Robot loop started");

        while !shutdown.load(Ordering::SeqCst) {
            if max_ticks.is_some_and(|max| self.ticks - start_ticks >= max) {
                info!("Tick budget exhausted");
                break;
            }
            let started = Instant::now();
            let report = self.step();
            if let NavState::Seeking(t) = report.state {
                debug!(tick = report.tick, x = report.pose.x, y = report.pose.y, tx = t.x, ty = t.y, "seeking");
            }
            if let Some(rest) = tick_period.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        if let Err(e) = self.hardware.motors.send_command(MotorCommand::STOP) {
            self.motor_faults += 1;
            warn!(error = %e, "final stop command not applied");
        }

        let summary = RunSummary {
            ticks: self.ticks - start_ticks,
            motor_faults: self.motor_faults - start_faults,
        };
        info!(ticks = summary.ticks, motor_faults = summary.motor_faults, "Robot loop stopped");
        summary
    }
}
