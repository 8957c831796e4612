// orbcore/src/physics.rs
use glam::{Quat, Vec3};

// Rapier is a private implementation detail: do NOT re-export it.
use rapier3d::na::{Isometry3, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Fixed simulation timestep. Wall-clock frame time is covered by
/// sub-stepping, never by stretching the integration step.
pub const FIXED_DT: f32 = 1.0 / 60.0;
/// At most this many sub-steps per `step` call; backlog beyond that is shed.
const MAX_SUBSTEPS: u32 = 3;

const GRAVITY_Y: f32 = -20.0;
// Single contact material for the whole world, fixed at construction.
const FRICTION: f32 = 0.4;
const RESTITUTION: f32 = 0.1;
// Damping for the rolling sphere.
const BALL_LINEAR_DAMPING: f32 = 0.1;
const BALL_ANGULAR_DAMPING: f32 = 0.25;

/// Opaque handle to a rigid body owned by a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyHandle(RigidBodyHandle);

/// Fixed-timestep wrapper around the rigid-body simulation.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    gravity: Vector<Real>,
    accumulator: f32,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = FIXED_DT;

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            gravity: vector![0.0, GRAVITY_Y, 0.0],
            accumulator: 0.0,
        }
    }

    /// Create the rolling ball: dynamic, mass 1, CCD enabled so a fast flick
    /// cannot tunnel through a thin platform.
    pub fn create_dynamic_sphere(&mut self, radius: f32) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .linear_damping(BALL_LINEAR_DAMPING)
            .angular_damping(BALL_ANGULAR_DAMPING)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::ball(radius)
            .mass(1.0)
            .friction(FRICTION)
            .restitution(RESTITUTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        BodyHandle(handle)
    }

    /// Create an immovable platform box. `rotation` is an XYZ Euler in
    /// radians.
    pub fn create_static_box(
        &mut self,
        half_extents: Vec3,
        position: Vec3,
        rotation: Vec3,
    ) -> BodyHandle {
        let pose = Isometry3::from_parts(
            Translation3::new(position.x, position.y, position.z),
            UnitQuaternion::from_euler_angles(rotation.x, rotation.y, rotation.z),
        );
        let body = RigidBodyBuilder::fixed().position(pose).build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(FRICTION)
            .restitution(RESTITUTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        BodyHandle(handle)
    }

    /// Remove a body together with its colliders.
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation to cover `wall_dt` seconds of wall-clock time
    /// using fixed sub-steps. Per-frame forces are cleared after the first
    /// sub-step that integrates them.
    pub fn step(&mut self, wall_dt: f32) {
        self.accumulator += wall_dt;
        let mut substeps = 0;
        while self.accumulator >= FIXED_DT && substeps < MAX_SUBSTEPS {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &(),
                &(),
            );
            for (_, body) in self.bodies.iter_mut() {
                body.reset_forces(false);
            }
            self.accumulator -= FIXED_DT;
            substeps += 1;
        }
        if self.accumulator > FIXED_DT {
            self.accumulator = FIXED_DT;
        }
    }

    pub fn body_position(&self, handle: BodyHandle) -> Option<Vec3> {
        let body = self.bodies.get(handle.0)?;
        let t = body.translation();
        Some(Vec3::new(t.x, t.y, t.z))
    }

    pub fn body_rotation(&self, handle: BodyHandle) -> Option<Quat> {
        let body = self.bodies.get(handle.0)?;
        let q = body.rotation().quaternion();
        Some(Quat::from_xyzw(
            q.coords.x,
            q.coords.y,
            q.coords.z,
            q.coords.w,
        ))
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        let body = self.bodies.get(handle.0)?;
        let v = body.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    /// Teleport a body, waking it.
    pub fn set_body_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_angvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Drop any force accumulated for the next sub-step.
    pub fn clear_forces(&mut self, handle: BodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.reset_forces(true);
        }
    }

    /// Accumulate a force for the next sub-step.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    /// Instantaneous velocity change.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
