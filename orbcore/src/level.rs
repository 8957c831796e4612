//! Level aggregate: platforms, collectibles, goal checking, respawn policy,
//! and completion detection. The central orchestrator of each gameplay tick.

use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::{Ball, Collectible, CollectibleDef, Platform, PlatformDef};
use crate::events::{EventBus, GameEvent};
use crate::game::GameConfig;
use crate::physics::PhysicsWorld;

/// Ball must be this close to the goal centre, horizontally, to finish.
const GOAL_RADIUS: f32 = 1.0;
/// ...and slower than this (settled on the pad, not flying through it).
const GOAL_MAX_SPEED: f32 = 8.0;
const GOAL_SPIN_SPEED: f32 = 0.8;

/// Immutable declarative level definition, supplied by the level-data
/// collaborator. Loaded once, never mutated.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LevelLayout {
    pub name: String,
    pub start_position: Vec3,
    pub goal_position: Vec3,
    pub platforms: Vec<PlatformDef>,
    pub collectibles: Vec<CollectibleDef>,
    /// How many orbs must be collected before the goal activates.
    pub collectibles_required: u32,
}

impl LevelLayout {
    /// Parse a layout from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse level layout")
    }
}

/// A live level run. Exclusively owns its physics world, ball, platforms,
/// and collectibles; dropping it releases every body with the world.
pub struct Level {
    layout: LevelLayout,
    physics: PhysicsWorld,
    ball: Ball,
    platforms: Vec<Platform>,
    collectibles: Vec<Collectible>,
    bus: Rc<EventBus>,

    collected: u32,
    done: bool,
    fall_cooldown: f32,
    goal_spin: f32,

    fall_threshold: f32,
    fall_cooldown_window: f32,
}

impl Level {
    pub fn new(layout: LevelLayout, bus: Rc<EventBus>, config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new();

        let mut ball = Ball::new(&mut physics);
        ball.reset_to(&mut physics, layout.start_position);

        let platforms = layout
            .platforms
            .iter()
            .map(|def| Platform::new(def, &mut physics))
            .collect();
        let collectibles = layout.collectibles.iter().map(Collectible::new).collect();

        log::info!(
            "level '{}' built: {} platforms, {} collectibles ({} required)",
            layout.name,
            layout.platforms.len(),
            layout.collectibles.len(),
            layout.collectibles_required
        );

        Self {
            layout,
            physics,
            ball,
            platforms,
            collectibles,
            bus,
            collected: 0,
            done: false,
            fall_cooldown: 0.0,
            goal_spin: 0.0,
            fall_threshold: config.fall_threshold,
            fall_cooldown_window: config.fall_cooldown,
        }
    }

    /// Advance one gameplay tick. A completed level is terminal: further
    /// calls are no-ops.
    pub fn update(&mut self, dt: f32) {
        if self.done {
            return;
        }

        self.physics.step(dt);
        self.ball.sync(&self.physics);
        self.fall_cooldown = (self.fall_cooldown - dt).max(0.0);

        let ball_position = self.ball.position();
        let required = self.layout.collectibles_required;
        for collectible in &mut self.collectibles {
            if collectible.update(dt, ball_position) {
                self.collected += 1;
                log::debug!("collectible picked ({}/{required})", self.collected);
                self.bus.publish(&GameEvent::CollectiblePicked {
                    position: collectible.position(),
                    collected: self.collected,
                    required,
                });
            }
        }

        self.goal_spin += dt * GOAL_SPIN_SPEED;

        if self.ball.is_falling(&self.physics, self.fall_threshold) && self.fall_cooldown == 0.0 {
            // Suppress repeat triggers while the ball keeps falling before
            // the respawn lands.
            self.fall_cooldown = self.fall_cooldown_window;
            log::debug!("ball fell below {}", self.fall_threshold);
            self.bus.publish(&GameEvent::BallFell);
            return;
        }

        if self.collected >= self.layout.collectibles_required && self.goal_reached() {
            self.done = true;
            log::info!("level '{}' complete", self.layout.name);
            self.bus.publish(&GameEvent::LevelComplete {
                collected: self.collected,
            });
        }
    }

    /// Put the ball back at the start. Collected orbs and platform state are
    /// untouched.
    pub fn respawn(&mut self) {
        log::debug!("respawning at {:?}", self.layout.start_position);
        self.ball.reset_to(&mut self.physics, self.layout.start_position);
    }

    pub fn apply_input(&mut self, axes: crate::input::InputAxes) {
        self.ball.apply_input(&mut self.physics, axes);
    }

    pub fn apply_flick(&mut self, flick: crate::input::Flick, camera_forward: Vec3) {
        self.ball.apply_flick(&mut self.physics, flick, camera_forward);
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_velocity(&self) -> Vec3 {
        self.ball.velocity(&self.physics)
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn goal_spin(&self) -> f32 {
        self.goal_spin
    }

    pub fn collected_count(&self) -> u32 {
        self.collected
    }

    pub fn required_count(&self) -> u32 {
        self.layout.collectibles_required
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    fn goal_reached(&self) -> bool {
        let goal = self.layout.goal_position;
        let ball = self.ball.position();
        // Horizontal distance only: the ball must be near the disc centre,
        // not just touching its rim.
        let dx = ball.x - goal.x;
        let dz = ball.z - goal.z;
        let xz_dist = (dx * dx + dz * dz).sqrt();
        let speed = self.ball_velocity().length();
        xz_dist < GOAL_RADIUS && speed < GOAL_MAX_SPEED
    }

    #[cfg(test)]
    pub(crate) fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }
}
