//! Ball, platform, and collectible game objects.
//!
//! Entities own their physics-body handles and a visual-transform mirror;
//! the level controller drives them and the render collaborator reads the
//! mirrors.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{Flick, InputAxes};
use crate::physics::{BodyHandle, PhysicsWorld};

pub const BALL_RADIUS: f32 = 0.4;
/// Rolling acceleration: force applied per held axis, every playing tick.
const ROLL_FORCE: f32 = 28.0;

// Tune these until the flick feel is right. Screen velocity is in px/s;
// the impulse acts on a mass-1 body.
const FLICK_SCALE: f32 = 0.005;
const FLICK_MAX_IMPULSE: f32 = 12.0;
/// Below this horizontal camera-forward length the flick basis is unusable
/// (camera looking straight down) and the impulse is skipped.
const MIN_FLICK_BASIS: f32 = 0.001;

const COLLECT_RADIUS: f32 = 1.1;
const BOB_SPEED: f32 = 2.0;
const BOB_HEIGHT: f32 = 0.18;
const SPIN_SPEED: f32 = 1.8;

/// Static platform geometry, straight from the level layout.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlatformDef {
    pub position: Vec3,
    pub size: Vec3,
    /// XYZ Euler rotation in radians.
    #[serde(default)]
    pub rotation: Option<Vec3>,
    /// Packed RGB for the render collaborator.
    #[serde(default)]
    pub color: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CollectibleDef {
    pub position: Vec3,
}

/// The player-controlled rolling sphere.
pub struct Ball {
    body: BodyHandle,
    position: Vec3,
    rotation: Quat,
}

impl Ball {
    pub fn new(physics: &mut PhysicsWorld) -> Self {
        Self {
            body: physics.create_dynamic_sphere(BALL_RADIUS),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Zero velocity, spin, and any accumulated force, then teleport. Used
    /// for spawn and respawn so no residual momentum carries over.
    pub fn reset_to(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        physics.set_linear_velocity(self.body, Vec3::ZERO);
        physics.set_angular_velocity(self.body, Vec3::ZERO);
        physics.clear_forces(self.body);
        physics.set_body_position(self.body, position);
        self.sync(physics);
    }

    /// Continuous rolling force from the keyboard axis snapshot.
    pub fn apply_input(&self, physics: &mut PhysicsWorld, axes: InputAxes) {
        physics.apply_force(
            self.body,
            Vec3::new(axes.x * ROLL_FORCE, 0.0, axes.y * ROLL_FORCE),
        );
    }

    /// One-shot impulse from a consumed flick, reprojected from screen space
    /// into world space using the camera's current forward vector.
    ///
    /// Screen right (+vx) maps to camera right; screen up (−vy) maps to
    /// camera forward.
    pub fn apply_flick(&self, physics: &mut PhysicsWorld, flick: Flick, camera_forward: Vec3) {
        let mut forward = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
        let basis_len = forward.length();
        if basis_len <= MIN_FLICK_BASIS {
            return;
        }
        forward /= basis_len;
        let right = forward.cross(Vec3::Y);

        let ix = (right.x * flick.screen_vx - forward.x * flick.screen_vy) * FLICK_SCALE;
        let iz = (right.z * flick.screen_vx - forward.z * flick.screen_vy) * FLICK_SCALE;

        let magnitude = (ix * ix + iz * iz).sqrt();
        let clamp = if magnitude > FLICK_MAX_IMPULSE {
            FLICK_MAX_IMPULSE / magnitude
        } else {
            1.0
        };
        physics.apply_impulse(self.body, Vec3::new(ix * clamp, 0.0, iz * clamp));
    }

    /// Copy the body transform into the visual mirror. Call after each
    /// physics step.
    pub fn sync(&mut self, physics: &PhysicsWorld) {
        if let Some(position) = physics.body_position(self.body) {
            self.position = position;
        }
        if let Some(rotation) = physics.body_rotation(self.body) {
            self.rotation = rotation;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn velocity(&self, physics: &PhysicsWorld) -> Vec3 {
        physics.linear_velocity(self.body).unwrap_or(Vec3::ZERO)
    }

    /// True once the body has dropped below the fall threshold.
    pub fn is_falling(&self, physics: &PhysicsWorld, threshold: f32) -> bool {
        physics
            .body_position(self.body)
            .is_some_and(|p| p.y < threshold)
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// Immutable static platform. The body is owned by the level's physics
/// world; the handle here exists for disposal bookkeeping and debugging.
pub struct Platform {
    body: BodyHandle,
}

impl Platform {
    pub fn new(def: &PlatformDef, physics: &mut PhysicsWorld) -> Self {
        Self {
            body: physics.create_static_box(
                def.size * 0.5,
                def.position,
                def.rotation.unwrap_or(Vec3::ZERO),
            ),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// A floating orb the ball picks up by proximity. Collection is
/// irreversible and triggers exactly once.
pub struct Collectible {
    base: Vec3,
    position: Vec3,
    spin: f32,
    age: f32,
    collected: bool,
}

impl Collectible {
    pub fn new(def: &CollectibleDef) -> Self {
        Self {
            base: def.position,
            position: def.position,
            spin: 0.0,
            age: 0.0,
            collected: false,
        }
    }

    /// Advance the bob/spin animation and test proximity to the ball.
    /// Returns `true` on the single tick the orb is picked up.
    pub fn update(&mut self, dt: f32, ball_position: Vec3) -> bool {
        if self.collected {
            return false;
        }

        self.age += dt;
        self.spin += SPIN_SPEED * dt;
        self.position.y = self.base.y + (self.age * BOB_SPEED).sin() * BOB_HEIGHT;

        if self.position.distance(ball_position) < COLLECT_RADIUS {
            self.collected = true;
            return true;
        }
        false
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }
}
