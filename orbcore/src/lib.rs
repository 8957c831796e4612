//! Orbcore - the gameplay core of Orb Odyssey, a physics-driven
//! roll-a-ball platformer.
//!
//! Rendering, audio playback, and UI are collaborators behind the traits in
//! [`game`]; everything simulated lives here.

pub mod camera;
pub mod entities;
pub mod events;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod state;

pub use crate::camera::FollowCamera;
pub use crate::entities::{Ball, Collectible, CollectibleDef, Platform, PlatformDef};
pub use crate::events::{EventBus, EventKind, GameEvent, HandlerId};
pub use crate::game::{AudioSink, Game, GameConfig, HudSink, RenderSink};
pub use crate::input::{Flick, InputAggregator, InputAxes};
pub use crate::level::{Level, LevelLayout};
pub use crate::physics::{BodyHandle, PhysicsWorld};
pub use crate::state::{GameState, InvalidTransition, StateMachine};
pub use winit::event::{ElementState, TouchPhase};
pub use winit::keyboard::KeyCode;
