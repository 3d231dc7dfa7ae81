//! Motor boundary.
//!
//! The navigation controller produces a [`MotorCommand`]; a [`MotorSink`]
//! is whatever applies it.  [`DifferentialDrive`] is the usual wheeled
//! implementation: it decomposes `(v, ω)` into per-wheel velocity targets
//! and forwards them to two [`Actuator`]s.

use explorer_types::{ExplorerError, MotorCommand};
use tracing::debug;

/// Applies motor commands.  No acknowledgment is modelled; an `Err` only
/// reports that the command could not be handed to the hardware.
pub trait MotorSink: Send {
    /// # Errors
    ///
    /// [`ExplorerError::HardwareFault`] when the command cannot be applied.
    fn send_command(&mut self, command: MotorCommand) -> Result<(), ExplorerError>;
}

/// A velocity-controlled wheel motor.
pub trait Actuator: Send {
    /// Stable identifier, e.g. `"left_wheel"`.
    fn id(&self) -> &str;

    /// Command a wheel surface speed in m/s.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::HardwareFault`] if the motor is faulted.
    fn set_velocity(&mut self, velocity: f32) -> Result<(), ExplorerError>;

    /// Most recently commanded velocity.
    fn velocity(&self) -> f32;
}

/// Two-wheel differential base.
pub struct DifferentialDrive {
    left: Box<dyn Actuator>,
    right: Box<dyn Actuator>,
    /// Distance between the wheel contact points, in metres.
    track_width: f32,
}

impl DifferentialDrive {
    pub fn new(left: Box<dyn Actuator>, right: Box<dyn Actuator>, track_width: f32) -> Self {
        Self {
            left,
            right,
            track_width,
        }
    }

    /// `(left, right)` wheel velocities for `command`.
    pub fn wheel_velocities(&self, command: MotorCommand) -> (f32, f32) {
        let half = command.angular_speed * self.track_width * 0.5;
        (command.linear_speed - half, command.linear_speed + half)
    }

    pub fn left(&self) -> &dyn Actuator {
        self.left.as_ref()
    }

    pub fn right(&self) -> &dyn Actuator {
        self.right.as_ref()
    }
}

impl MotorSink for DifferentialDrive {
    fn send_command(&mut self, command: MotorCommand) -> Result<(), ExplorerError> {
        let (l, r) = self.wheel_velocities(command);
        debug!(left = l, right = r, "differential drive command");
        self.left.set_velocity(l)?;
        self.right.set_velocity(r)?;
        Ok(())
    }
}
