//! Third-person chase camera smoothed from ball velocity.

use glam::Vec3;

const CAMERA_DISTANCE: f32 = 10.0;
const CAMERA_HEIGHT: f32 = 6.0;
const LOOK_AHEAD: f32 = 2.0;
/// Minimum flat speed (units/s) before the camera rotates to follow the
/// direction of travel; below it the last orientation is kept.
const DIR_SPEED_THRESHOLD: f32 = 1.0;
const DIR_SMOOTHING: f32 = 2.5;
const POS_SMOOTHING: f32 = 5.0;

/// Keeps the camera behind the ball's direction of travel.
///
/// The only persistent state is a horizontal unit vector pointing from the
/// ball to the camera; it is blended, never snapped, so the orientation
/// cannot jitter when the velocity flips sign frame to frame. Position is
/// smoothed in a second, independent stage.
pub struct FollowCamera {
    /// Unit vector (XZ plane) from ball to camera.
    direction: Vec3,
    position: Vec3,
    look_target: Vec3,
}

impl FollowCamera {
    pub fn new() -> Self {
        // Starts behind a ball moving in -Z: camera on the +Z side.
        Self {
            direction: Vec3::Z,
            position: Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE),
            look_target: Vec3::ZERO,
        }
    }

    /// Advance both smoothing stages for one frame.
    pub fn follow(&mut self, ball_position: Vec3, vel_x: f32, vel_z: f32, dt: f32) {
        let flat_speed = (vel_x * vel_x + vel_z * vel_z).sqrt();

        if flat_speed > DIR_SPEED_THRESHOLD {
            // "Behind" is opposite to the direction of travel.
            let target = Vec3::new(-vel_x / flat_speed, 0.0, -vel_z / flat_speed);
            let blended = self
                .direction
                .lerp(target, (dt * DIR_SMOOTHING).min(1.0));
            if let Some(unit) = blended.try_normalize() {
                self.direction = unit;
            }
        }

        let desired = Vec3::new(
            ball_position.x + self.direction.x * CAMERA_DISTANCE,
            ball_position.y + CAMERA_HEIGHT,
            ball_position.z + self.direction.z * CAMERA_DISTANCE,
        );
        self.position = self.position.lerp(desired, (dt * POS_SMOOTHING).min(1.0));

        let forward = Vec3::new(-self.direction.x, 0.0, -self.direction.z);
        self.look_target = ball_position + forward * LOOK_AHEAD;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point just ahead of the ball along its direction of travel.
    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    /// World-space view direction; the flick reprojection basis.
    pub fn forward(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or_zero()
    }
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn direction_stays_unit_length() {
        let mut camera = FollowCamera::new();
        for i in 0..240 {
            // Swing the velocity around to exercise the blend.
            let angle = i as f32 * 0.1;
            camera.follow(Vec3::ZERO, angle.cos() * 4.0, angle.sin() * 4.0, DT);
            assert_relative_eq!(camera.direction.length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn stationary_ball_leaves_direction_unchanged() {
        let mut camera = FollowCamera::new();
        let before = camera.direction;
        for _ in 0..120 {
            camera.follow(Vec3::new(3.0, 1.0, -2.0), 0.0, 0.0, DT);
        }
        assert_eq!(camera.direction, before);
    }

    #[test]
    fn slow_drift_below_threshold_does_not_rotate() {
        let mut camera = FollowCamera::new();
        let before = camera.direction;
        for _ in 0..120 {
            camera.follow(Vec3::ZERO, 0.5, 0.0, DT);
        }
        assert_eq!(camera.direction, before);
    }

    #[test]
    fn direction_converges_behind_sustained_motion() {
        let mut camera = FollowCamera::new();
        let target = Vec3::new(-1.0, 0.0, 0.0); // behind a ball moving +X

        let mut last_alignment = camera.direction.dot(target);
        for _ in 0..600 {
            camera.follow(Vec3::ZERO, 5.0, 0.0, DT);
            let alignment = camera.direction.dot(target);
            assert!(alignment >= last_alignment - 1e-5, "alignment regressed");
            last_alignment = alignment;
        }
        assert_relative_eq!(last_alignment, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn position_settles_at_the_follow_offset() {
        let mut camera = FollowCamera::new();
        let ball = Vec3::new(4.0, 1.0, -6.0);
        for _ in 0..600 {
            camera.follow(ball, 0.0, 0.0, DT);
        }
        let expected = ball + Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE);
        assert_relative_eq!(camera.position().x, expected.x, epsilon = 1e-2);
        assert_relative_eq!(camera.position().y, expected.y, epsilon = 1e-2);
        assert_relative_eq!(camera.position().z, expected.z, epsilon = 1e-2);
    }

    #[test]
    fn look_target_leads_the_ball() {
        let mut camera = FollowCamera::new();
        for _ in 0..600 {
            camera.follow(Vec3::ZERO, 5.0, 0.0, DT);
        }
        // Ball travels +X, so the camera looks ahead of it along +X.
        assert!(camera.look_target().x > 1.5);
        let forward = camera.forward();
        assert!(forward.x > 0.0);
        assert!(forward.y < 0.0, "camera looks down from its height offset");
    }
}
