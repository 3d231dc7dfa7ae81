//! `explorer-runtime` – the control loops.
//!
//! - [`navigation`] – [`NavigationController`][navigation::NavigationController]:
//!   target + pose in, motor command out.
//! - [`robot_loop`] – [`RobotLoop`][robot_loop::RobotLoop]: frame → detect →
//!   associate → navigate → actuate, once per tick.
//! - [`interaction`] – [`UserInteraction`][interaction::UserInteraction]: the
//!   AR-glasses loop with voice commands.
//! - [`guidance`], [`audio`], [`llm`] – the pieces human mode is built from.
//! - [`telemetry`] – tracing subscriber setup.

pub mod audio;
pub mod guidance;
pub mod interaction;
pub mod llm;
pub mod navigation;
pub mod robot_loop;
pub mod telemetry;

pub use navigation::{NavState, NavigationConfig, NavigationController, SteeringLaw};
pub use robot_loop::{RobotHardware, RobotLoop, RunSummary, TickReport};
