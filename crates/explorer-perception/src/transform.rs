//! Rigid-body transforms and the pluggable camera-to-shared-frame step.
//!
//! The detection mapper first produces a point in the *camera optical frame*
//! (X right, Y down, Z forward).  A [`FrameTransform`] then decides how that
//! point is expressed in the frame shared with [`Pose`]:
//!
//! - [`CameraRelative`] leaves it untouched (the point stays relative to the
//!   observer, which is what the placeholder depth model can honestly claim).
//! - [`PlanarWorld`] re-expresses it in the robot body frame and applies the
//!   heading and ground position of the observer's [`CameraPose`], landing X/Y
//!   in world coordinates.  Z keeps the camera depth.
//!
//! # Example
//!
//! ```rust
//! use explorer_perception::transform::{CameraPose, FrameTransform, PlanarWorld, Vec3};
//! use explorer_types::Pose;
//!
//! // Robot at (1, 2) facing +y; an object 2 m straight ahead of the camera.
//! let pose = CameraPose::from(Pose::new(1.0, 2.0, std::f32::consts::FRAC_PI_2));
//! let p = PlanarWorld.to_shared_frame(Vec3::new(0.0, 0.0, 2.0), &pose);
//! assert!((p.x - 1.0).abs() < 1e-5);
//! assert!((p.y - 4.0).abs() < 1e-5);
//! assert_eq!(p.z, 2.0);
//! ```

use explorer_types::Pose;

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A unit quaternion (w, x, y, z) describing an orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Build a quaternion from raw components.  The caller supplies a unit
    /// quaternion.
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `yaw` radians about +Z (counter-clockwise seen from above).
    pub fn from_yaw(yaw: f32) -> Self {
        let (s, c) = (yaw * 0.5).sin_cos();
        Self::new(c, 0.0, 0.0, s)
    }

    /// Intrinsic Z-Y-X (yaw, pitch, roll) rotation.
    pub fn from_euler(yaw: f32, pitch: f32, roll: f32) -> Self {
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sr, cr) = (roll * 0.5).sin_cos();
        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    /// Hamilton product `self * rhs`.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Heading about +Z of the rotated x axis.
    pub fn yaw(self) -> f32 {
        (2.0 * (self.w * self.z + self.x * self.y))
            .atan2(1.0 - 2.0 * (self.y * self.y + self.z * self.z))
    }

    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate `v`: p' = q · p · q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let r = self.mul(p).mul(self.conjugate());
        Vec3::new(r.x, r.y, r.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// Pose of a child frame inside a parent frame.  Applying it maps a point
/// expressed in the child into the parent: rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform3D {
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// If `self` = T_A_B and `other` = T_B_C, returns T_A_C.
    pub fn compose(self, other: Self) -> Self {
        Self::new(
            self.apply(other.translation),
            self.rotation.mul(other.rotation),
        )
    }

    /// Map a child-frame point into the parent frame.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.translation.add(self.rotation.rotate(point))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera pose
// ────────────────────────────────────────────────────────────────────────────

/// Position and orientation of the observing camera in the shared frame.
///
/// The orientation follows the body convention (x forward, y left, z up);
/// [`PlanarWorld`] handles the swap from the optical convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl CameraPose {
    pub fn new(position: Vec3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Head-mounted camera at the origin, oriented by the wearer's
    /// `(yaw, pitch, roll)`.
    pub fn from_head_orientation(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::new(Vec3::zero(), Quaternion::from_euler(yaw, pitch, roll))
    }

    pub fn as_transform(&self) -> Transform3D {
        Transform3D::new(self.position, self.orientation)
    }

    /// Ground-plane part of the pose: position with z = 0 and heading only.
    pub fn planar(&self) -> Transform3D {
        Transform3D::new(
            Vec3::new(self.position.x, self.position.y, 0.0),
            Quaternion::from_yaw(self.orientation.yaw()),
        )
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }
}

impl From<Pose> for CameraPose {
    fn from(pose: Pose) -> Self {
        Self::new(
            Vec3::new(pose.x, pose.y, 0.0),
            Quaternion::from_yaw(pose.heading_rad),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FrameTransform
// ────────────────────────────────────────────────────────────────────────────

/// Converts a camera optical-frame point into the frame shared with `Pose`.
///
/// Implementations must be pure: same inputs, same output.
pub trait FrameTransform: Send + Sync {
    fn to_shared_frame(&self, camera_point: Vec3, camera_pose: &CameraPose) -> Vec3;
}

/// Keeps the point relative to the camera; the camera pose is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraRelative;

impl FrameTransform for CameraRelative {
    fn to_shared_frame(&self, camera_point: Vec3, _camera_pose: &CameraPose) -> Vec3 {
        camera_point
    }
}

/// Optical frame (right, down, forward) expressed in the body frame
/// (forward, left, up).
fn optical_to_body() -> Transform3D {
    Transform3D::new(Vec3::zero(), Quaternion::new(0.5, -0.5, 0.5, -0.5))
}

/// Places the point on the world ground plane using the camera's heading and
/// position.  X/Y are world coordinates; Z stays the optical depth, so it is
/// as positive as the depth the mapper assumed.  Vertical offset and head
/// pitch/roll do not move the point.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarWorld;

impl FrameTransform for PlanarWorld {
    fn to_shared_frame(&self, camera_point: Vec3, camera_pose: &CameraPose) -> Vec3 {
        let on_ground = Vec3::new(camera_point.x, 0.0, camera_point.z);
        let world = camera_pose
            .planar()
            .compose(optical_to_body())
            .apply(on_ground);
        Vec3::new(world.x, world.y, camera_point.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    #[test]
    fn from_yaw_matches_hand_built_quaternion() {
        let q = Quaternion::from_yaw(FRAC_PI_2);
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((q.z - FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn yaw_quarter_turn_rotates_x_onto_y() {
        let r = Quaternion::from_yaw(FRAC_PI_2).rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(close(r, Vec3::new(0.0, 1.0, 0.0)), "got {r:?}");
    }

    #[test]
    fn euler_with_only_yaw_equals_from_yaw() {
        let a = Quaternion::from_euler(0.7, 0.0, 0.0);
        let b = Quaternion::from_yaw(0.7);
        assert!((a.w - b.w).abs() < 1e-6 && (a.z - b.z).abs() < 1e-6);
        assert!(a.x.abs() < 1e-6 && a.y.abs() < 1e-6);
    }

    #[test]
    fn pitch_down_tilts_forward_axis_below_horizon() {
        // Positive pitch about +y turns +x towards -z.
        let r = Quaternion::from_euler(0.0, FRAC_PI_2, 0.0).rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(close(r, Vec3::new(0.0, 0.0, -1.0)), "got {r:?}");
    }

    #[test]
    fn conjugate_undoes_rotation() {
        let q = Quaternion::from_euler(0.3, -0.2, 0.9);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(close(q.conjugate().rotate(q.rotate(v)), v));
    }

    #[test]
    fn compose_chains_translation_through_rotation() {
        let base = Transform3D::new(Vec3::zero(), Quaternion::from_yaw(FRAC_PI_2));
        let mount = Transform3D::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity());
        let t = base.compose(mount);
        assert!(close(t.translation, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn camera_relative_ignores_pose() {
        let pose = CameraPose::from(Pose::new(10.0, -3.0, 1.0));
        let p = Vec3::new(0.25, 0.0, 2.0);
        assert_eq!(CameraRelative.to_shared_frame(p, &pose), p);
    }

    #[test]
    fn planar_world_at_origin_maps_depth_to_forward() {
        let p = PlanarWorld.to_shared_frame(Vec3::new(0.0, 0.0, 2.0), &CameraPose::default());
        assert!(close(p, Vec3::new(2.0, 0.0, 2.0)), "got {p:?}");
    }

    #[test]
    fn planar_world_right_of_centre_lands_on_negative_y() {
        let p = PlanarWorld.to_shared_frame(Vec3::new(0.5, 0.0, 2.0), &CameraPose::default());
        assert!(close(p, Vec3::new(2.0, -0.5, 2.0)), "got {p:?}");
    }

    #[test]
    fn planar_world_applies_heading_and_position() {
        let pose = CameraPose::from(Pose::new(1.0, 2.0, FRAC_PI_2));
        let p = PlanarWorld.to_shared_frame(Vec3::new(0.0, 0.0, 2.0), &pose);
        assert!(close(p, Vec3::new(1.0, 4.0, 2.0)), "got {p:?}");
    }

    #[test]
    fn optical_to_body_swaps_axes() {
        let t = optical_to_body();
        assert!(close(t.apply(Vec3::new(0.0, 0.0, 1.0)), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(t.apply(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, -1.0, 0.0)));
        assert!(close(t.apply(Vec3::new(0.0, 1.0, 0.0)), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn yaw_is_recovered_from_euler() {
        let q = Quaternion::from_euler(0.8, 0.3, -0.2);
        assert!((q.yaw() - 0.8).abs() < 1e-5);
        assert!((Quaternion::identity().yaw()).abs() < 1e-6);
    }

    #[test]
    fn planar_world_ignores_vertical_offset_and_pitch() {
        let pose = CameraPose::from_head_orientation(0.0, 0.4, 0.1);
        let p = PlanarWorld.to_shared_frame(Vec3::new(0.0, 0.8, 2.0), &pose);
        assert!(close(p, Vec3::new(2.0, 0.0, 2.0)), "got {p:?}");
    }

    #[test]
    fn head_orientation_pose_sits_at_origin() {
        let pose = CameraPose::from_head_orientation(0.0, 0.0, 0.0);
        assert_eq!(pose, CameraPose::default());
    }
}
