//! Top-level orchestrator: wires input, level, camera, state machine, and
//! collaborators together and drives one synchronous update per frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use glam::{Quat, Vec3};

use crate::camera::FollowCamera;
use crate::events::{EventBus, EventKind, GameEvent};
use crate::input::InputAggregator;
use crate::level::{Level, LevelLayout};
use crate::state::{GameState, StateMachine};

/// Render collaborator. Receives per-entity transforms and the camera every
/// tick after physics sync; how meshes are built from them is out of scope.
pub trait RenderSink {
    /// A new level was constructed; rebuild static scenery from its layout.
    fn level_rebuilt(&mut self, _layout: &LevelLayout) {}
    /// The current level was disposed; drop its scenery.
    fn level_cleared(&mut self) {}
    fn ball_moved(&mut self, _position: Vec3, _rotation: Quat) {}
    fn collectible_updated(&mut self, _index: usize, _position: Vec3, _spin: f32, _visible: bool) {}
    fn goal_spun(&mut self, _spin: f32) {}
    fn camera_moved(&mut self, _position: Vec3, _look_target: Vec3) {}
}

/// Audio collaborator. Fire-and-forget cues, no ordering guarantee relative
/// to rendering.
pub trait AudioSink {
    fn collectible_picked(&mut self) {}
    fn level_completed(&mut self) {}
}

/// UI collaborator: score readout and the big centre message.
pub trait HudSink {
    fn set_score(&mut self, _collected: u32, _required: u32) {}
    fn show_message(&mut self, _title: &str, _subtitle: &str) {}
    fn hide_message(&mut self) {}
}

// Null collaborators for tests and headless use.
impl RenderSink for () {}
impl AudioSink for () {}
impl HudSink for () {}

/// Gameplay tuning that varies with level design.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    /// World-Y below which the ball counts as fallen.
    pub fall_threshold: f32,
    /// Suppression window after a fall event, in seconds.
    pub fall_cooldown: f32,
    /// Frame delta clamp, in seconds. Clamped, not dropped, so a
    /// backgrounded session resumes with one bounded step.
    pub max_frame_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fall_threshold: -15.0,
            fall_cooldown: 1.5,
            max_frame_dt: 0.05,
        }
    }
}

/// Flags set synchronously by bus handlers and applied by `tick` at a fixed
/// point in the same frame, once the level borrow is released.
#[derive(Default)]
struct PendingActions {
    respawn: Cell<bool>,
    complete: Cell<bool>,
}

/// The game. Owns every aggregate; nothing here is a global.
pub struct Game {
    config: GameConfig,
    bus: Rc<EventBus>,
    state: StateMachine,
    input: InputAggregator,
    camera: FollowCamera,
    level: Option<Level>,

    render: Box<dyn RenderSink>,
    audio: Rc<RefCell<dyn AudioSink>>,
    hud: Rc<RefCell<dyn HudSink>>,
    pending: Rc<PendingActions>,
}

impl Game {
    pub fn new(
        config: GameConfig,
        render: Box<dyn RenderSink>,
        audio: Rc<RefCell<dyn AudioSink>>,
        hud: Rc<RefCell<dyn HudSink>>,
    ) -> Self {
        let mut state = StateMachine::new();
        state.on_change(|new_state| log::debug!("game state -> {new_state:?}"));

        Self {
            config,
            bus: Rc::new(EventBus::new()),
            state,
            input: InputAggregator::new(),
            camera: FollowCamera::new(),
            level: None,
            render,
            audio,
            hud,
            pending: Rc::new(PendingActions::default()),
        }
    }

    /// Dispose any running level and start the given layout from scratch.
    ///
    /// The bus is cleared and handlers re-registered so nothing wired for
    /// the previous level survives into this one.
    pub fn start_level(&mut self, layout: LevelLayout) -> Result<()> {
        if self.level.take().is_some() {
            self.render.level_cleared();
        }
        self.bus.clear();
        self.pending.respawn.set(false);
        self.pending.complete.set(false);
        self.wire_handlers();

        self.render.level_rebuilt(&layout);
        self.hud.borrow_mut().set_score(0, layout.collectibles_required);
        self.hud.borrow_mut().hide_message();

        self.level = Some(Level::new(layout, Rc::clone(&self.bus), &self.config));

        match self.state.state() {
            GameState::Menu | GameState::LevelComplete | GameState::GameOver => {
                self.state.transition(GameState::Playing)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// One frame of simulation. Safe no-op outside `Playing` or with no
    /// level; the external scheduler just keeps calling it.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        let dt = dt.min(self.config.max_frame_dt);

        if self.state.state() != GameState::Playing {
            return Ok(());
        }
        let Some(level) = self.level.as_mut() else {
            return Ok(());
        };

        // Desktop: continuous force from held keys.
        level.apply_input(self.input.axes());

        // Touch: one-shot impulse reprojected through the camera basis.
        if let Some(flick) = self.input.consume_flick() {
            level.apply_flick(flick, self.camera.forward());
        }

        level.update(dt);

        if self.pending.respawn.take() {
            level.respawn();
        }
        if self.pending.complete.take() {
            self.state.transition(GameState::LevelComplete)?;
        }

        self.render.ball_moved(level.ball().position(), level.ball().rotation());
        for (index, orb) in level.collectibles().iter().enumerate() {
            self.render.collectible_updated(
                index,
                orb.position(),
                orb.spin(),
                !orb.is_collected(),
            );
        }
        self.render.goal_spun(level.goal_spin());

        let velocity = level.ball_velocity();
        self.camera
            .follow(level.ball().position(), velocity.x, velocity.z, dt);
        self.render
            .camera_moved(self.camera.position(), self.camera.look_target());

        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.state.transition(GameState::Paused)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.state.transition(GameState::Playing)?;
        Ok(())
    }

    /// Leave a finished run (complete or game over) for the menu.
    pub fn return_to_menu(&mut self) -> Result<()> {
        self.state.transition(GameState::Menu)?;
        if self.level.take().is_some() {
            self.render.level_cleared();
        }
        self.bus.clear();
        Ok(())
    }

    /// Raw-input entry point for the host shell.
    pub fn input_mut(&mut self) -> &mut InputAggregator {
        &mut self.input
    }

    pub fn state(&self) -> GameState {
        self.state.state()
    }

    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    fn wire_handlers(&mut self) {
        let audio = Rc::clone(&self.audio);
        let hud = Rc::clone(&self.hud);
        self.bus.subscribe(EventKind::CollectiblePicked, move |event| {
            if let GameEvent::CollectiblePicked {
                collected, required, ..
            } = event
            {
                audio.borrow_mut().collectible_picked();
                hud.borrow_mut().set_score(*collected, *required);
            }
        });

        let audio = Rc::clone(&self.audio);
        let hud = Rc::clone(&self.hud);
        let pending = Rc::clone(&self.pending);
        self.bus.subscribe(EventKind::LevelComplete, move |_| {
            pending.complete.set(true);
            audio.borrow_mut().level_completed();
            hud.borrow_mut().show_message("You did it!", "Tap to play again");
        });

        let pending = Rc::clone(&self.pending);
        self.bus.subscribe(EventKind::BallFell, move |_| {
            pending.respawn.set(true);
        });
    }
}
