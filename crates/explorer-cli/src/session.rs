//! Mode runners: wire simulated devices into the runtime loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use colored::Colorize;
use explorer_hal::{ScriptedVoice, SimGlasses, SimRobot};
use explorer_perception::{Catalog, DetectionMapper, FixedBoxDetector};
use explorer_runtime::audio::ConsoleAudioEngine;
use explorer_runtime::guidance::{GuidanceUpdate, NavigationAssistance};
use explorer_runtime::interaction::{HumanDevices, InteractionOutcome, UserInteraction, VoiceResponse};
use explorer_runtime::llm::CannedLanguageModel;
use explorer_runtime::{NavigationController, RobotHardware, RobotLoop, RunSummary};
use explorer_types::{ExplorerError, Pose};
use tracing::info;

use crate::config::Config;

/// How a robot-mode session ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotOutcome {
    pub summary: RunSummary,
    /// A goal was given and the controller reached it.
    pub arrived: bool,
    pub final_pose: Pose,
}

/// Robot mode against a simulated robot driven through its differential
/// base.  Returns when `shutdown` is set or the tick budget runs out.
///
/// # Errors
///
/// [`ExplorerError::Config`] when the tick rate gives no usable period.
pub fn run_robot(
    cfg: &Config,
    catalog: Catalog,
    mapper: DetectionMapper,
    goal: Option<(f32, f32)>,
    shutdown: &AtomicBool,
    max_ticks: Option<u64>,
) -> Result<RobotOutcome, ExplorerError> {
    let period = cfg.runtime.tick_period()?;
    let robot = SimRobot::new(period.as_secs_f32()).with_camera(cfg.runtime.camera_width, cfg.runtime.camera_height);
    robot.connect();

    let mut robot_loop = RobotLoop::new(
        RobotHardware {
            frames: Box::new(robot.clone()),
            pose: Box::new(robot.clone()),
            motors: Box::new(robot.differential_drive(cfg.runtime.track_width)),
        },
        Box::new(FixedBoxDetector::default()),
        catalog,
        mapper,
        NavigationController::new(cfg.navigation),
    );

    if let Some((x, y)) = goal {
        robot_loop.navigation_mut().set_destination(x, y);
        println!("  Heading for {}", format!("({x:.2}, {y:.2})").bold());
    } else {
        println!("  {}", "No --goal given; holding position.".dimmed());
    }

    let summary = robot_loop.run(shutdown, period, max_ticks);
    robot.disconnect();

    let pose = explorer_hal::PoseSource::get_pose(&robot);
    let arrived = goal.is_some() && robot_loop.navigation().is_idle();
    info!(ticks = summary.ticks, arrived, "Robot mode stopped");
    if let Some(obs) = robot_loop.latest_observation() {
        for obj in &obs.objects {
            println!("    • {} [{}] at {}", obj.name.bold(), obj.category, obj.position);
        }
    }
    if summary.motor_faults > 0 {
        println!("  {} motor fault(s) logged", summary.motor_faults.to_string().red());
    }
    Ok(RobotOutcome {
        summary,
        arrived,
        final_pose: pose,
    })
}

pub fn print_robot_outcome(outcome: &RobotOutcome) {
    let pose = outcome.final_pose;
    println!();
    println!(
        "  {} after {} tick(s), final pose ({:.2}, {:.2}, {:.2} rad)",
        if outcome.arrived { "Arrived".green().bold() } else { "Stopped".yellow().bold() },
        outcome.summary.ticks,
        pose.x,
        pose.y,
        pose.heading_rad
    );
}

/// Human (AR glasses) mode against simulated glasses.  Returns the number of
/// interaction steps run.
///
/// # Errors
///
/// [`ExplorerError::Config`] when the tick rate gives no usable period.
pub fn run_human(
    cfg: &Config,
    catalog: Catalog,
    mapper: DetectionMapper,
    voice: ScriptedVoice,
    shutdown: &AtomicBool,
    max_ticks: Option<u64>,
) -> Result<u64, ExplorerError> {
    let period = cfg.runtime.tick_period()?;
    let glasses = SimGlasses::new(cfg.runtime.camera_width, cfg.runtime.camera_height).with_voice(voice);
    glasses.connect();

    let mut audio = ConsoleAudioEngine::new();
    audio.initialize();

    let mut ui = UserInteraction::new(
        HumanDevices {
            frames: Box::new(glasses.clone()),
            head: Box::new(glasses.clone()),
            voice: Box::new(glasses.clone()),
        },
        Box::new(FixedBoxDetector::default()),
        catalog,
        mapper,
        Box::new(audio),
        NavigationAssistance::default(),
        Box::new(CannedLanguageModel::default()),
    );

    let mut ticks = 0u64;
    while !shutdown.load(Ordering::SeqCst) && max_ticks.is_none_or(|max| ticks < max) {
        let started = Instant::now();
        let outcome = ui.process_input();
        ticks += 1;
        print_outcome(&outcome);
        if let Some(rest) = period.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    glasses.disconnect();
    info!(ticks, "Human mode stopped");
    Ok(ticks)
}

fn print_outcome(outcome: &InteractionOutcome) {
    if let Some(cmd) = &outcome.voice_command {
        println!("  {} {}", "»".bold(), cmd.italic());
    }
    match &outcome.response {
        Some(VoiceResponse::NavigationStarted(t)) => println!("    → guiding you to the {}", t.bold()),
        Some(VoiceResponse::Described(answer)) => println!("    → {answer}"),
        Some(VoiceResponse::Located { name, position }) => {
            println!("    → the {} is at {}", name.bold(), position)
        }
        Some(VoiceResponse::NotFound(name)) => println!("    → {} is not in view", name.yellow()),
        Some(VoiceResponse::Unrecognized(_)) => println!("    → {}", "command not recognized".yellow()),
        Some(VoiceResponse::LlmFailed(e)) => println!("    → {}: {e}", "language model error".red()),
        None => {}
    }
    match &outcome.guidance {
        GuidanceUpdate::Instruction(text) => println!("    {} {text}", "↪".cyan()),
        GuidanceUpdate::Arrived => println!("    {}", "✓ destination reached".green()),
        GuidanceUpdate::Idle | GuidanceUpdate::NotInView => {}
    }
}
