//! Navigation controller.
//!
//! A two-state machine, [`NavState::Idle`] and [`NavState::Seeking`], that
//! turns the current pose into a [`MotorCommand`] once per tick.
//!
//! - Idle ticks always return [`MotorCommand::STOP`], so a caller that
//!   applies every returned command holds position.
//! - A Seeking tick within `arrival_threshold` of the target clears the
//!   target, goes Idle and returns STOP.
//! - Otherwise the configured [`SteeringLaw`] produces the command.
//!
//! [`NavigationController::tick`] depends only on the current state, the
//! pose passed in and the configuration.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use explorer_types::{ExplorerError, MotorCommand, Pose, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_arrival_threshold() -> f32 {
    0.2
}

fn default_forward_speed() -> f32 {
    0.1
}

fn default_gain() -> f32 {
    1.0
}

fn default_max_angular_speed() -> f32 {
    0.5
}

fn default_turn_in_place_threshold() -> f32 {
    FRAC_PI_2
}

/// How a Seeking tick turns distance and bearing into a command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum SteeringLaw {
    /// Drive forward at `forward_speed` with no heading correction.
    StraightLine,
    /// Proportional heading correction toward the target.
    HeadingProportional {
        #[serde(default = "default_gain")]
        gain: f32,
        /// Clamp on |angular_speed|, rad/s.
        #[serde(default = "default_max_angular_speed")]
        max_angular_speed: f32,
        /// Above this |heading error| the robot turns in place.
        #[serde(default = "default_turn_in_place_threshold")]
        turn_in_place_threshold: f32,
    },
}

impl Default for SteeringLaw {
    fn default() -> Self {
        Self::HeadingProportional {
            gain: default_gain(),
            max_angular_speed: default_max_angular_speed(),
            turn_in_place_threshold: default_turn_in_place_threshold(),
        }
    }
}

/// Tunables for [`NavigationController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Distance below which the target counts as reached.
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold: f32,
    /// Linear speed while seeking.
    #[serde(default = "default_forward_speed")]
    pub forward_speed: f32,
    #[serde(default)]
    pub steering: SteeringLaw,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: default_arrival_threshold(),
            forward_speed: default_forward_speed(),
            steering: SteeringLaw::default(),
        }
    }
}

impl NavigationConfig {
    /// The minimal straight-line configuration.
    pub fn straight_line() -> Self {
        Self {
            steering: SteeringLaw::StraightLine,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ExplorerError> {
        if !(self.arrival_threshold.is_finite() && self.arrival_threshold > 0.0) {
            return Err(ExplorerError::Config(format!(
                "navigation.arrival_threshold must be positive, got {}",
                self.arrival_threshold
            )));
        }
        if !(self.forward_speed.is_finite() && self.forward_speed >= 0.0) {
            return Err(ExplorerError::Config(format!(
                "navigation.forward_speed must not be negative, got {}",
                self.forward_speed
            )));
        }
        if let SteeringLaw::HeadingProportional {
            gain,
            max_angular_speed,
            turn_in_place_threshold,
        } = self.steering
            && !(gain.is_finite()
                && max_angular_speed.is_finite()
                && max_angular_speed >= 0.0
                && turn_in_place_threshold.is_finite()
                && turn_in_place_threshold >= 0.0)
        {
            return Err(ExplorerError::Config(
                "navigation.steering parameters must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavState {
    Idle,
    Seeking(Target),
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavigationConfig,
    state: NavState,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: NavState::Idle,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn target(&self) -> Option<Target> {
        match self.state {
            NavState::Seeking(t) => Some(t),
            NavState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == NavState::Idle
    }

    /// Set (or overwrite) the target.  Takes effect on the next tick.
    pub fn set_destination(&mut self, x: f32, y: f32) {
        let target = Target::new(x, y);
        info!(x, y, "Destination set");
        self.state = NavState::Seeking(target);
    }

    /// Cancel navigation.  No-op when already idle.
    pub fn clear_destination(&mut self) {
        if let NavState::Seeking(t) = self.state {
            info!(x = t.x, y = t.y, "Destination cleared");
            self.state = NavState::Idle;
        }
    }

    pub fn distance_to_target(&self, pose: &Pose) -> Option<f32> {
        self.target().map(|t| t.distance_from(pose))
    }

    /// One control step.
    pub fn tick(&mut self, pose: &Pose) -> MotorCommand {
        let NavState::Seeking(target) = self.state else {
            return MotorCommand::STOP;
        };

        let distance = target.distance_from(pose);
        if distance < self.config.arrival_threshold {
            info!(x = target.x, y = target.y, distance, "Destination reached");
            self.state = NavState::Idle;
            return MotorCommand::STOP;
        }

        let command = steer(&self.config, &target, pose);
        debug!(
            distance,
            linear = command.linear_speed,
            angular = command.angular_speed,
            "navigation tick"
        );
        command
    }
}

fn steer(config: &NavigationConfig, target: &Target, pose: &Pose) -> MotorCommand {
    match config.steering {
        SteeringLaw::StraightLine => MotorCommand::new(config.forward_speed, 0.0),
        SteeringLaw::HeadingProportional {
            gain,
            max_angular_speed,
            turn_in_place_threshold,
        } => {
            let bearing = (target.y - pose.y).atan2(target.x - pose.x);
            let error = normalize_angle(bearing - pose.heading_rad);
            let angular = (gain * error).clamp(-max_angular_speed, max_angular_speed);
            let linear = if error.abs() > turn_in_place_threshold {
                0.0
            } else {
                config.forward_speed
            };
            MotorCommand::new(linear, angular)
        }
    }
}

/// Wrap into `(-π, π]`.
fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
