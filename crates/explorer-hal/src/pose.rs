//! Pose and orientation sources.

use explorer_types::Pose;

/// Localization boundary.  The returned pose is treated as ground truth for
/// the tick in which it is read.
pub trait PoseSource: Send {
    fn get_pose(&self) -> Pose;
}

/// Head-mounted orientation sensor (AR glasses IMU).
pub trait HeadTracker: Send {
    /// `(yaw, pitch, roll)` in radians.
    fn head_orientation(&self) -> (f32, f32, f32);
}

/// A pose that never moves.  Handy for fixed cameras and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPose(pub Pose);

impl PoseSource for FixedPose {
    fn get_pose(&self) -> Pose {
        self.0
    }
}
