//! `explorer-hal` – the device boundary.
//!
//! Every piece of hardware the explorer talks to sits behind a small trait:
//!
//! - [`camera::FrameSource`] – camera frames (robot camera, AR glasses).
//! - [`pose::PoseSource`] / [`pose::HeadTracker`] – where the device is and
//!   which way it faces.
//! - [`drive::MotorSink`] – applies `(linear, angular)` motor commands;
//!   [`drive::DifferentialDrive`] maps them onto two wheel [`drive::Actuator`]s.
//! - [`voice::VoiceCommandSource`] – transcribed user speech.
//!
//! [`sim`] provides in-process implementations of all of them.

pub mod camera;
pub mod drive;
pub mod pose;
pub mod sim;
pub mod voice;

pub use camera::{CameraFrame, FrameSource};
pub use drive::{Actuator, DifferentialDrive, MotorSink};
pub use pose::{FixedPose, HeadTracker, PoseSource};
pub use sim::{SimGlasses, SimRobot, SimWheel};
pub use voice::{ScriptedVoice, VoiceCommandSource};
