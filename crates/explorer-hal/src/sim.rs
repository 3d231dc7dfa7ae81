//! In-process simulated devices for running the explorer without hardware.
//!
//! [`SimRobot`] is a connectable wheeled robot: it integrates accepted motor
//! commands with unicycle kinematics over a fixed step, so the navigation
//! loop sees its pose move.  Commands arrive either whole, through its own
//! [`MotorSink`] impl, or per wheel through the [`SimWheel`]s of
//! [`SimRobot::differential_drive`].  [`SimGlasses`] stands in for AR glasses:
//! synthetic frames, a level head and a scripted voice channel.
//!
//! Both are cheap clonable handles over shared state, so one device can be
//! handed to a loop as its frame source, pose source and motor sink at once.
//!
//! # Example
//!
//! ```rust
//! use explorer_hal::drive::MotorSink;
//! use explorer_hal::pose::PoseSource;
//! use explorer_hal::sim::SimRobot;
//! use explorer_types::MotorCommand;
//!
//! let mut robot = SimRobot::new(0.5);
//! robot.connect();
//! robot.send_command(MotorCommand::new(1.0, 0.0)).expect("sim drive must succeed");
//! assert!((robot.get_pose().x - 0.5).abs() < 1e-6);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use explorer_types::{ExplorerError, MotorCommand, Pose};
use tracing::{info, warn};

use crate::camera::{CameraFrame, FrameSource};
use crate::drive::{Actuator, DifferentialDrive, MotorSink};
use crate::pose::{HeadTracker, PoseSource};
use crate::voice::{ScriptedVoice, VoiceCommandSource};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn wrap_angle(a: f32) -> f32 {
    let mut a = a % std::f32::consts::TAU;
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    } else if a <= -std::f32::consts::PI {
        a += std::f32::consts::TAU;
    }
    a
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated robot
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct RobotState {
    connected: bool,
    pose: Pose,
    last_command: MotorCommand,
    commands_applied: u64,
    camera: Option<(u32, u32)>,
    /// Last commanded `[left, right]` wheel velocities.
    wheel_velocity: [f32; 2],
    /// Which wheels have a target for the step not yet integrated.
    wheel_pending: [bool; 2],
}

impl RobotState {
    fn apply(&mut self, command: MotorCommand, dt: f32) {
        let heading = self.pose.heading_rad;
        self.pose.x += command.linear_speed * heading.cos() * dt;
        self.pose.y += command.linear_speed * heading.sin() * dt;
        self.pose.heading_rad = wrap_angle(heading + command.angular_speed * dt);
        self.last_command = command;
        self.commands_applied += 1;
    }
}

/// Simulated wheeled robot.
#[derive(Debug, Clone)]
pub struct SimRobot {
    state: Arc<Mutex<RobotState>>,
    dt: f32,
}

impl SimRobot {
    /// A disconnected robot at the origin that integrates each accepted
    /// command over `dt` seconds.
    pub fn new(dt: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(RobotState {
                connected: false,
                pose: Pose::default(),
                last_command: MotorCommand::STOP,
                commands_applied: 0,
                camera: None,
                wheel_velocity: [0.0; 2],
                wheel_pending: [false; 2],
            })),
            dt,
        }
    }

    /// Attach a camera producing blank `width × height` frames.
    pub fn with_camera(self, width: u32, height: u32) -> Self {
        lock(&self.state).camera = Some((width, height));
        self
    }

    /// A differential base whose two wheels drive this robot.  The base moves
    /// one step once both wheels have a new target.
    pub fn differential_drive(&self, track_width: f32) -> DifferentialDrive {
        let wheel = |side| {
            Box::new(SimWheel {
                side,
                robot: self.clone(),
                track_width,
            }) as Box<dyn Actuator>
        };
        DifferentialDrive::new(wheel(WheelSide::Left), wheel(WheelSide::Right), track_width)
    }

    pub fn connect(&self) {
        lock(&self.state).connected = true;
        info!("Simulated robot connected");
    }

    pub fn disconnect(&self) {
        lock(&self.state).connected = false;
        info!("Simulated robot disconnected");
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    /// Teleport the robot.  Heading is wrapped into `(-π, π]`.
    pub fn set_pose(&self, pose: Pose) {
        lock(&self.state).pose = Pose::new(pose.x, pose.y, wrap_angle(pose.heading_rad));
    }

    pub fn last_command(&self) -> MotorCommand {
        lock(&self.state).last_command
    }

    /// Number of commands accepted since construction.
    pub fn commands_applied(&self) -> u64 {
        lock(&self.state).commands_applied
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated wheels
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WheelSide {
    Left,
    Right,
}

impl WheelSide {
    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// One wheel motor of a [`SimRobot`], built by
/// [`SimRobot::differential_drive`].
#[derive(Debug)]
pub struct SimWheel {
    side: WheelSide,
    robot: SimRobot,
    track_width: f32,
}

impl Actuator for SimWheel {
    fn id(&self) -> &str {
        match self.side {
            WheelSide::Left => "left_wheel",
            WheelSide::Right => "right_wheel",
        }
    }

    fn set_velocity(&mut self, velocity: f32) -> Result<(), ExplorerError> {
        let mut s = lock(&self.robot.state);
        if !s.connected {
            warn!(wheel = self.id(), "Robot not connected");
            return Err(ExplorerError::hardware_fault(self.id(), "robot not connected"));
        }
        let i = self.side.index();
        s.wheel_velocity[i] = velocity;
        s.wheel_pending[i] = true;

        if s.wheel_pending == [true, true] {
            s.wheel_pending = [false, false];
            let [left, right] = s.wheel_velocity;
            let command = MotorCommand::new((left + right) * 0.5, (right - left) / self.track_width);
            s.apply(command, self.robot.dt);
        }
        Ok(())
    }

    fn velocity(&self) -> f32 {
        lock(&self.robot.state).wheel_velocity[self.side.index()]
    }
}

impl PoseSource for SimRobot {
    fn get_pose(&self) -> Pose {
        lock(&self.state).pose
    }
}

impl MotorSink for SimRobot {
    fn send_command(&mut self, command: MotorCommand) -> Result<(), ExplorerError> {
        let mut s = lock(&self.state);
        if !s.connected {
            warn!("Robot not connected");
            return Err(ExplorerError::hardware_fault("sim_robot", "robot not connected"));
        }
        s.apply(command, self.dt);
        Ok(())
    }
}

impl FrameSource for SimRobot {
    fn get_frame(&mut self) -> Option<CameraFrame> {
        let s = lock(&self.state);
        if !s.connected {
            return None;
        }
        s.camera.map(|(w, h)| CameraFrame::blank(w, h))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated glasses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct GlassesState {
    connected: bool,
    orientation: (f32, f32, f32),
    voice: ScriptedVoice,
}

/// Simulated AR glasses.
#[derive(Debug, Clone)]
pub struct SimGlasses {
    state: Arc<Mutex<GlassesState>>,
    width: u32,
    height: u32,
}

impl SimGlasses {
    /// Disconnected glasses with a level head and a silent voice channel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(GlassesState {
                connected: false,
                orientation: (0.0, 0.0, 0.0),
                voice: ScriptedVoice::default(),
            })),
            width,
            height,
        }
    }

    pub fn with_voice(self, voice: ScriptedVoice) -> Self {
        lock(&self.state).voice = voice;
        self
    }

    pub fn connect(&self) {
        lock(&self.state).connected = true;
        info!("Simulated glasses connected");
    }

    pub fn disconnect(&self) {
        lock(&self.state).connected = false;
        info!("Simulated glasses disconnected");
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    pub fn set_orientation(&self, yaw: f32, pitch: f32, roll: f32) {
        lock(&self.state).orientation = (yaw, pitch, roll);
    }

    /// Polls left in the voice script.
    pub fn voice_remaining(&self) -> usize {
        lock(&self.state).voice.remaining()
    }
}

impl FrameSource for SimGlasses {
    fn get_frame(&mut self) -> Option<CameraFrame> {
        if !self.is_connected() {
            warn!("Glasses not connected");
            return None;
        }
        Some(CameraFrame::blank(self.width, self.height))
    }
}

impl HeadTracker for SimGlasses {
    fn head_orientation(&self) -> (f32, f32, f32) {
        let s = lock(&self.state);
        if s.connected { s.orientation } else { (0.0, 0.0, 0.0) }
    }
}

impl VoiceCommandSource for SimGlasses {
    fn capture_voice_command(&mut self) -> Option<String> {
        let mut s = lock(&self.state);
        if !s.connected {
            return None;
        }
        s.voice.capture_voice_command()
    }
}
